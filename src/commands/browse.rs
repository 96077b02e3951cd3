use async_trait::async_trait;

use super::{Command, CommandResult, parse_position};
use crate::storefront::Storefront;

pub struct CatalogCommand;

#[async_trait]
impl Command for CatalogCommand {
    fn name(&self) -> &str {
        "/catalog"
    }

    fn aliases(&self) -> &[&str] {
        &["/ls"]
    }

    fn description(&self) -> &str {
        "show the catalog"
    }

    async fn execute(&self, _args: &str, store: &Storefront) -> CommandResult {
        println!("{}", store.show_page());
        CommandResult::Handled
    }
}

pub struct ShowCommand;

#[async_trait]
impl Command for ShowCommand {
    fn name(&self) -> &str {
        "/show"
    }

    fn usage(&self) -> &str {
        "N"
    }

    fn description(&self) -> &str {
        "open product N in detail"
    }

    async fn execute(&self, args: &str, store: &Storefront) -> CommandResult {
        match parse_position(args).and_then(|n| store.card(n)) {
            Some(card) => {
                card.select();
            }
            None => println!("no product {args:?}; catalog has {} items", store.catalog_len()),
        }
        CommandResult::Handled
    }
}

pub struct RefreshCommand;

#[async_trait]
impl Command for RefreshCommand {
    fn name(&self) -> &str {
        "/refresh"
    }

    fn description(&self) -> &str {
        "reload the catalog from the backend"
    }

    async fn execute(&self, _args: &str, store: &Storefront) -> CommandResult {
        store.refresh_catalog();
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_store;

    #[tokio::test]
    async fn show_opens_preview() {
        let store = test_store().await;
        ShowCommand.execute("2", &store).await;
        assert_eq!(store.modal().showing(), Some("card"));
        assert_eq!(store.state().preview().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn show_out_of_range_does_nothing() {
        let store = test_store().await;
        ShowCommand.execute("9", &store).await;
        ShowCommand.execute("", &store).await;
        assert!(!store.modal().is_open());
    }

    #[tokio::test]
    async fn refresh_queues_a_fetch() {
        let store = test_store().await;
        RefreshCommand.execute("", &store).await;
        // The mock has no second catalog scripted, so the fetch fails.
        assert_eq!(store.run_effects().await, 1);
        assert!(store.page().snapshot().notice.is_some());
        assert_eq!(store.catalog_len(), 2);
    }
}

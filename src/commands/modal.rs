use async_trait::async_trait;

use super::{Command, CommandResult};
use crate::storefront::Storefront;

pub struct CloseCommand;

#[async_trait]
impl Command for CloseCommand {
    fn name(&self) -> &str {
        "/close"
    }

    fn aliases(&self) -> &[&str] {
        &["/x"]
    }

    fn description(&self) -> &str {
        "close the open panel"
    }

    async fn execute(&self, _args: &str, store: &Storefront) -> CommandResult {
        if !store.close_modal() {
            println!("nothing to close");
        }
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_store;

    #[tokio::test]
    async fn closes_open_panel() {
        let store = test_store().await;
        store.page().open_basket();
        CloseCommand.execute("", &store).await;
        assert!(!store.modal().is_open());
        assert!(!store.page().snapshot().locked);
    }
}

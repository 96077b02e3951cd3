use async_trait::async_trait;

use super::{Command, CommandResult, parse_position};
use crate::storefront::Storefront;

pub struct AddCommand;

#[async_trait]
impl Command for AddCommand {
    fn name(&self) -> &str {
        "/add"
    }

    fn usage(&self) -> &str {
        "[N]"
    }

    fn description(&self) -> &str {
        "put product N (or the open product) in the basket"
    }

    async fn execute(&self, args: &str, store: &Storefront) -> CommandResult {
        let card = if args.is_empty() {
            if store.modal().showing() != Some("card") {
                println!("open a product with /show N first, or pass its number");
                return CommandResult::Handled;
            }
            None
        } else {
            match parse_position(args).and_then(|n| store.card(n)) {
                Some(card) => Some(card),
                None => {
                    println!("no product {args:?}");
                    return CommandResult::Handled;
                }
            }
        };

        let product = match &card {
            Some(card) => card.product(),
            None => store.preview().product(),
        };
        if let Some(product) = product.filter(|p| store.state().in_basket(&p.id)) {
            println!("{} is already in the basket", product.title);
            return CommandResult::Handled;
        }

        match card {
            Some(card) => card.press(),
            None => store.preview().press(),
        };
        CommandResult::Handled
    }
}

pub struct RemoveCommand;

#[async_trait]
impl Command for RemoveCommand {
    fn name(&self) -> &str {
        "/remove"
    }

    fn usage(&self) -> &str {
        "N"
    }

    fn description(&self) -> &str {
        "take line N out of the basket"
    }

    async fn execute(&self, args: &str, store: &Storefront) -> CommandResult {
        let removed = parse_position(args).is_some_and(|n| store.basket().remove(n));
        if !removed {
            println!("no basket line {args:?}");
        }
        CommandResult::Handled
    }
}

pub struct BasketCommand;

#[async_trait]
impl Command for BasketCommand {
    fn name(&self) -> &str {
        "/basket"
    }

    fn aliases(&self) -> &[&str] {
        &["/b"]
    }

    fn description(&self) -> &str {
        "open the basket"
    }

    async fn execute(&self, _args: &str, store: &Storefront) -> CommandResult {
        store.page().open_basket();
        CommandResult::Handled
    }
}

pub struct ClearCommand;

#[async_trait]
impl Command for ClearCommand {
    fn name(&self) -> &str {
        "/clear"
    }

    fn description(&self) -> &str {
        "empty the basket"
    }

    async fn execute(&self, _args: &str, store: &Storefront) -> CommandResult {
        store.state().clear_basket();
        CommandResult::Handled
    }
}

use async_trait::async_trait;

use super::{Command, CommandResult};
use crate::model::Payment;
use crate::storefront::Storefront;

/// True when the modal shows `region`; otherwise prints how to get there.
fn on_step(store: &Storefront, region: &str, hint: &str) -> bool {
    if store.modal().showing() == Some(region) {
        return true;
    }
    println!("{hint}");
    false
}

const ORDER_HINT: &str = "open the order form with /checkout first";
const CONTACTS_HINT: &str = "fill in the order form and continue with /next first";

pub struct CheckoutCommand;

#[async_trait]
impl Command for CheckoutCommand {
    fn name(&self) -> &str {
        "/checkout"
    }

    fn description(&self) -> &str {
        "start checkout with the current basket"
    }

    async fn execute(&self, _args: &str, store: &Storefront) -> CommandResult {
        if !store.basket().checkout() {
            println!("the basket is empty");
        }
        CommandResult::Handled
    }
}

pub struct PaymentCommand;

#[async_trait]
impl Command for PaymentCommand {
    fn name(&self) -> &str {
        "/payment"
    }

    fn usage(&self) -> &str {
        "card|cash"
    }

    fn description(&self) -> &str {
        "choose how to pay"
    }

    async fn execute(&self, args: &str, store: &Storefront) -> CommandResult {
        if !on_step(store, "order", ORDER_HINT) {
            return CommandResult::Handled;
        }
        match args.parse::<Payment>() {
            Ok(payment) => store.order_form().select_payment(payment),
            Err(e) => println!("{e}"),
        }
        CommandResult::Handled
    }
}

pub struct AddressCommand;

#[async_trait]
impl Command for AddressCommand {
    fn name(&self) -> &str {
        "/address"
    }

    fn usage(&self) -> &str {
        "TEXT"
    }

    fn description(&self) -> &str {
        "set the delivery address"
    }

    async fn execute(&self, args: &str, store: &Storefront) -> CommandResult {
        if on_step(store, "order", ORDER_HINT) {
            store.order_form().input_address(args);
        }
        CommandResult::Handled
    }
}

pub struct NextCommand;

#[async_trait]
impl Command for NextCommand {
    fn name(&self) -> &str {
        "/next"
    }

    fn description(&self) -> &str {
        "continue to contact details"
    }

    async fn execute(&self, _args: &str, store: &Storefront) -> CommandResult {
        if on_step(store, "order", ORDER_HINT) && !store.order_form().submit() {
            println!("choose a payment method and enter an address first");
        }
        CommandResult::Handled
    }
}

pub struct EmailCommand;

#[async_trait]
impl Command for EmailCommand {
    fn name(&self) -> &str {
        "/email"
    }

    fn usage(&self) -> &str {
        "TEXT"
    }

    fn description(&self) -> &str {
        "set the contact email"
    }

    async fn execute(&self, args: &str, store: &Storefront) -> CommandResult {
        if on_step(store, "contacts", CONTACTS_HINT) {
            store.contacts().input_email(args);
        }
        CommandResult::Handled
    }
}

pub struct PhoneCommand;

#[async_trait]
impl Command for PhoneCommand {
    fn name(&self) -> &str {
        "/phone"
    }

    fn usage(&self) -> &str {
        "TEXT"
    }

    fn description(&self) -> &str {
        "set the contact phone"
    }

    async fn execute(&self, args: &str, store: &Storefront) -> CommandResult {
        if on_step(store, "contacts", CONTACTS_HINT) {
            store.contacts().input_phone(args);
        }
        CommandResult::Handled
    }
}

pub struct SubmitCommand;

#[async_trait]
impl Command for SubmitCommand {
    fn name(&self) -> &str {
        "/submit"
    }

    fn aliases(&self) -> &[&str] {
        &["/pay"]
    }

    fn description(&self) -> &str {
        "place the order"
    }

    async fn execute(&self, _args: &str, store: &Storefront) -> CommandResult {
        if on_step(store, "contacts", CONTACTS_HINT) && !store.contacts().submit() {
            println!("enter a valid email and phone first");
        }
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_store;

    #[tokio::test]
    async fn checkout_refused_for_empty_basket() {
        let store = test_store().await;
        CheckoutCommand.execute("", &store).await;
        assert!(!store.modal().is_open());
    }

    #[tokio::test]
    async fn form_commands_need_their_step() {
        let store = test_store().await;
        PaymentCommand.execute("card", &store).await;
        EmailCommand.execute("a@b.co", &store).await;
        assert_eq!(store.state().order_form().payment, None);
        assert!(store.state().order_form().email.is_empty());
    }

    #[tokio::test]
    async fn next_waits_for_valid_order_step() {
        let store = test_store().await;
        store.card(1).unwrap().press();
        CheckoutCommand.execute("", &store).await;
        assert_eq!(store.modal().showing(), Some("order"));

        PaymentCommand.execute("online", &store).await;
        NextCommand.execute("", &store).await;
        assert_eq!(store.modal().showing(), Some("order"));

        AddressCommand.execute("Moscow", &store).await;
        NextCommand.execute("", &store).await;
        assert_eq!(store.modal().showing(), Some("contacts"));
        assert_eq!(store.state().order_form().payment, Some(Payment::Card));
    }

    #[tokio::test]
    async fn bad_payment_is_reported_not_stored() {
        let store = test_store().await;
        store.card(1).unwrap().press();
        CheckoutCommand.execute("", &store).await;
        PaymentCommand.execute("barter", &store).await;
        assert_eq!(store.state().order_form().payment, None);
    }

    #[tokio::test]
    async fn submit_needs_valid_contacts() {
        let store = test_store().await;
        store.card(1).unwrap().press();
        CheckoutCommand.execute("", &store).await;
        PaymentCommand.execute("cash", &store).await;
        AddressCommand.execute("Moscow", &store).await;
        NextCommand.execute("", &store).await;

        EmailCommand.execute("not-an-email", &store).await;
        PhoneCommand.execute("+7 999 123 45 67", &store).await;
        SubmitCommand.execute("", &store).await;
        assert_eq!(store.run_effects().await, 0);

        EmailCommand.execute("buyer@example.com", &store).await;
        SubmitCommand.execute("", &store).await;
        assert_eq!(store.run_effects().await, 1);
        assert_eq!(store.modal().showing(), Some("success"));
    }
}

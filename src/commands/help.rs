use async_trait::async_trait;

use super::{Command, CommandResult};
use crate::storefront::Storefront;

/// Placeholder entry for `/help`; the registry prints the listing itself.
pub struct HelpCommand;

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "/help"
    }

    fn aliases(&self) -> &[&str] {
        &["/h", "/?"]
    }

    fn description(&self) -> &str {
        "show this help"
    }

    async fn execute(&self, _args: &str, _store: &Storefront) -> CommandResult {
        CommandResult::Handled
    }
}

use async_trait::async_trait;

use super::{Command, CommandResult};
use crate::storefront::Storefront;

pub struct QuitCommand;

#[async_trait]
impl Command for QuitCommand {
    fn name(&self) -> &str {
        "/quit"
    }

    fn aliases(&self) -> &[&str] {
        &["quit", "exit", "/exit"]
    }

    fn description(&self) -> &str {
        "exit the storefront"
    }

    async fn execute(&self, _args: &str, _store: &Storefront) -> CommandResult {
        CommandResult::Quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_store;

    #[tokio::test]
    async fn returns_quit() {
        let store = test_store().await;
        assert_eq!(QuitCommand.execute("", &store).await, CommandResult::Quit);
    }

    #[test]
    fn has_aliases() {
        let aliases = QuitCommand.aliases();
        assert!(aliases.contains(&"quit"));
        assert!(aliases.contains(&"exit"));
        assert!(aliases.contains(&"/exit"));
    }
}

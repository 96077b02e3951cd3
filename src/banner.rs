//! Startup banner and exit summary display.

use crate::config::Endpoints;
use crate::consts::{AUTHOR, HOMEPAGE, REPO};
use crate::model::BasketSnapshot;
use crate::view::format_price;

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub endpoints: &'a Endpoints,
    pub storage: &'a str,
    pub restored: usize,
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║            W E B - L A R E K          ║
   ║      a storefront for developers      ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   repo      {}
   api       {}
   content   {}
   storage   {}
   basket    {} item(s) restored

   type /help for commands
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.endpoints.api_url,
        info.endpoints.cdn_url,
        info.storage,
        info.restored,
    );
}

/// One-line description of what is left in the basket.
pub fn basket_summary(basket: &BasketSnapshot) -> String {
    if basket.items.is_empty() {
        return "basket: empty".to_string();
    }
    format!(
        "basket: {} item(s), {} (kept for next time)",
        basket.count(),
        format_price(Some(basket.total)),
    )
}

/// Print the exit summary (basket + farewell).
pub fn print_exit_summary(basket: &BasketSnapshot) {
    println!("{}", basket_summary(basket));
    println!("goodbye.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Product;

    #[test]
    fn print_banner_does_not_panic() {
        let endpoints = Endpoints::from_origin("https://larek.test").unwrap();
        print_banner(&BannerInfo {
            endpoints: &endpoints,
            storage: "ephemeral",
            restored: 0,
        });
    }

    #[test]
    fn empty_basket_summary() {
        assert_eq!(basket_summary(&BasketSnapshot::default()), "basket: empty");
    }

    #[test]
    fn summary_counts_items_and_total() {
        let item = |id: &str, price| Product {
            id: id.to_string(),
            title: id.to_string(),
            price,
            category: String::new(),
            description: String::new(),
            image: String::new(),
        };
        let basket = BasketSnapshot {
            items: vec![item("a", Some(1000)), item("b", Some(450)), item("c", None)],
            total: 1450,
        };
        assert_eq!(
            basket_summary(&basket),
            "basket: 3 item(s), 1,450 synapses (kept for next time)"
        );
    }
}

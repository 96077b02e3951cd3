//! Text views. Each view renders one region of the screen from a plain data
//! snapshot and turns user actions into intent events on the bus. Views
//! never read [`AppState`](crate::state::AppState) themselves.

mod basket;
mod card;
mod contacts;
mod modal;
mod order_form;
mod page;
mod success;

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub use basket::{BasketView, BasketViewData};
pub use card::{CardData, CardMode, CardView};
pub use contacts::{ContactsFormData, ContactsFormView};
pub use modal::ModalView;
pub use order_form::{OrderFormData, OrderFormView};
pub use page::{PageData, PageView};
pub use success::{SuccessData, SuccessView};

use crate::consts::format_number;

/// Something that can draw itself from a snapshot.
pub trait View {
    type Snapshot;

    /// Update the region from `snapshot` and return what is now mounted.
    fn render(&self, snapshot: &Self::Snapshot) -> Mounted;
}

/// Rendered output of a view: which region it came from and its text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mounted {
    pub region: &'static str,
    pub text: String,
}

impl Mounted {
    pub fn new(region: &'static str, text: String) -> Self {
        Self { region, text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Mounted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// `"1,450 synapses"`, or `"Priceless"` for items without a price.
pub fn format_price(price: Option<u64>) -> String {
    match price {
        Some(p) => format!("{} synapses", format_number(p)),
        None => "Priceless".to_string(),
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

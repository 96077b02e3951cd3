//! Composition root.
//!
//! [`Storefront`] builds the event bus, the application state and every
//! view, then subscribes the handlers that connect them. Network calls never
//! run inside event dispatch: handlers queue an [`Effect`] and the caller
//! drains the queue with [`Storefront::run_effects`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::LarekApi;
use crate::events::{Event, EventBus, EventKind, Request};
use crate::model::{Order, OrderField, OrderResult, Payment, Product};
use crate::state::AppState;
use crate::storage::Storage;
use crate::validation::{self, CONTACTS_STEP, ORDER_STEP};
use crate::view::{
    BasketView, BasketViewData, CardData, CardMode, CardView, ContactsFormData, ContactsFormView,
    ModalView, Mounted, OrderFormData, OrderFormView, PageView, SuccessData, SuccessView, View,
};

/// Notice shown when the catalog cannot be fetched.
pub const CATALOG_FAILED: &str = "Could not load the catalog";

/// Error line shown when an order is rejected or never reaches the backend.
pub const ORDER_FAILED: &str = "Could not place the order, try again";

/// A network operation waiting to run outside of event dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchCatalog,
    SubmitOrder(Order),
}

type Handler = fn(&Shared, &Event) -> anyhow::Result<()>;

struct Shared {
    bus: Arc<EventBus>,
    state: AppState,
    api: Arc<dyn LarekApi>,
    page: PageView,
    modal: ModalView,
    basket: BasketView,
    order_form: OrderFormView,
    contacts: ContactsFormView,
    success: SuccessView,
    preview: CardView,
    cards: Mutex<Vec<Arc<CardView>>>,
    output: Mutex<Option<Mounted>>,
    effects: UnboundedSender<Effect>,
}

pub struct Storefront {
    shared: Arc<Shared>,
    effects: Mutex<UnboundedReceiver<Effect>>,
}

impl Storefront {
    pub fn new(api: Arc<dyn LarekApi>, storage: Box<dyn Storage>) -> Self {
        let bus = Arc::new(EventBus::new());
        let state = AppState::load(Arc::clone(&bus), storage);
        let (tx, rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            page: PageView::new(Arc::clone(&bus)),
            modal: ModalView::new(Arc::clone(&bus)),
            basket: BasketView::new(Arc::clone(&bus)),
            order_form: OrderFormView::new(Arc::clone(&bus)),
            contacts: ContactsFormView::new(Arc::clone(&bus)),
            success: SuccessView::new(Arc::clone(&bus)),
            preview: CardView::new(Arc::clone(&bus), CardMode::Preview),
            cards: Mutex::new(Vec::new()),
            output: Mutex::new(None),
            effects: tx,
            bus,
            state,
            api,
        });

        wire(&shared, EventKind::CatalogChanged, Shared::on_catalog_changed);
        wire(&shared, EventKind::CardSelect, Shared::on_card_select);
        wire(&shared, EventKind::PreviewChanged, Shared::on_preview_changed);
        wire(&shared, EventKind::CardAdd, Shared::on_card_add);
        wire(&shared, EventKind::CardRemove, Shared::on_card_remove);
        wire(&shared, EventKind::BasketChanged, Shared::on_basket_changed);
        wire(&shared, EventKind::BasketOpen, Shared::on_basket_open);
        wire(&shared, EventKind::OrderOpen, Shared::on_order_open);
        wire(&shared, EventKind::ContactsOpen, Shared::on_contacts_open);
        for kind in [
            EventKind::PaymentChanged,
            EventKind::AddressChanged,
            EventKind::EmailChanged,
            EventKind::PhoneChanged,
        ] {
            wire(&shared, kind, Shared::on_field_changed);
        }
        wire(&shared, EventKind::FormErrorsChanged, Shared::on_form_errors);
        wire(&shared, EventKind::OrderSubmit, Shared::on_order_submit);
        wire(&shared, EventKind::OrderSuccess, Shared::on_order_success);
        wire(&shared, EventKind::RequestFailed, Shared::on_request_failed);
        wire(&shared, EventKind::ModalOpen, Shared::on_modal_open);
        wire(&shared, EventKind::ModalClose, Shared::on_modal_close);

        shared.bus.on_all(Arc::new(|event: &Event| -> anyhow::Result<()> {
            tracing::debug!(event = event.name(), "dispatch");
            Ok(())
        }));

        tracing::debug!(handlers = shared.bus.len(), "storefront wired");

        Self {
            shared,
            effects: Mutex::new(rx),
        }
    }

    /// Announce the restored basket and queue the first catalog fetch.
    pub fn start(&self) {
        self.shared.state.publish_basket();
        self.shared.queue(Effect::FetchCatalog);
    }

    pub fn refresh_catalog(&self) {
        self.shared.queue(Effect::FetchCatalog);
    }

    /// Run queued effects until the queue is empty, including effects queued
    /// by the handlers of earlier ones. Returns how many ran.
    pub async fn run_effects(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = lock(&self.effects).try_recv();
            let Ok(effect) = next else {
                break;
            };
            self.execute(effect).await;
            ran += 1;
        }
        ran
    }

    async fn execute(&self, effect: Effect) {
        let s = &self.shared;
        match effect {
            Effect::FetchCatalog => match s.api.product_list().await {
                Ok(items) => s.state.set_catalog(items),
                Err(e) => {
                    tracing::warn!(error = %e, "catalog request failed");
                    s.bus.emit(Event::RequestFailed {
                        request: Request::Catalog,
                        message: CATALOG_FAILED.to_string(),
                    });
                }
            },
            Effect::SubmitOrder(order) => match s.api.order_products(&order).await {
                Ok(result) => {
                    tracing::info!(id = %result.id, total = result.total, "order placed");
                    s.state.clear_basket();
                    s.state.reset_order_form();
                    // The charge shown is what was sent, not the server's echo.
                    s.bus.emit(Event::OrderSuccess(OrderResult {
                        id: result.id,
                        total: order.total,
                    }));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "order request failed");
                    s.bus.emit(Event::RequestFailed {
                        request: Request::Order,
                        message: ORDER_FAILED.to_string(),
                    });
                }
            },
        }
    }

    /// What changed on screen since the last call, if anything.
    pub fn take_output(&self) -> Option<Mounted> {
        lock(&self.shared.output).take()
    }

    /// The page as it currently stands.
    pub fn show_page(&self) -> Mounted {
        self.shared.page.refresh()
    }

    /// Catalog card at 1-based `position`.
    pub fn card(&self, position: usize) -> Option<Arc<CardView>> {
        let cards = lock(&self.shared.cards);
        position
            .checked_sub(1)
            .and_then(|i| cards.get(i))
            .map(Arc::clone)
    }

    pub fn catalog_len(&self) -> usize {
        lock(&self.shared.cards).len()
    }

    /// Close whatever the modal shows. The success panel closes through its
    /// own control.
    pub fn close_modal(&self) -> bool {
        match self.shared.modal.showing() {
            Some("success") => {
                self.shared.success.close();
                true
            }
            Some(_) => self.shared.modal.close(),
            None => false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.shared.state
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.shared.bus
    }

    pub fn page(&self) -> &PageView {
        &self.shared.page
    }

    pub fn modal(&self) -> &ModalView {
        &self.shared.modal
    }

    pub fn preview(&self) -> &CardView {
        &self.shared.preview
    }

    pub fn basket(&self) -> &BasketView {
        &self.shared.basket
    }

    pub fn order_form(&self) -> &OrderFormView {
        &self.shared.order_form
    }

    pub fn contacts(&self) -> &ContactsFormView {
        &self.shared.contacts
    }
}

impl Drop for Storefront {
    fn drop(&mut self) {
        // Handlers hold the shared state; dropping them breaks the cycle.
        self.shared.bus.destroy();
    }
}

fn wire(shared: &Arc<Shared>, kind: EventKind, handler: Handler) {
    let s = Arc::clone(shared);
    shared.bus.on(kind, move |event| handler(&s, event));
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn queue(&self, effect: Effect) {
        if self.effects.send(effect).is_err() {
            tracing::warn!("effect queue closed, dropping effect");
        }
    }

    fn show(&self, mounted: Mounted) {
        *lock(&self.output) = Some(mounted);
    }

    fn card_data(&self, product: Product, position: Option<usize>) -> CardData {
        CardData {
            in_basket: self.state.in_basket(&product.id),
            product,
            position,
        }
    }

    /// Re-render every catalog card so its basket mark is current.
    fn render_catalog(&self) {
        let cards = lock(&self.cards).clone();
        let mounted = cards
            .iter()
            .enumerate()
            .filter_map(|(i, card)| {
                let product = card.product()?;
                Some(card.render(&self.card_data(product, Some(i + 1))))
            })
            .collect();
        self.page.set_catalog(mounted);
    }

    fn on_catalog_changed(&self, _: &Event) -> anyhow::Result<()> {
        let mut cards = Vec::new();
        let mut mounted = Vec::new();
        for (i, product) in self.state.catalog().into_iter().enumerate() {
            let card = CardView::new(Arc::clone(&self.bus), CardMode::Catalog);
            mounted.push(card.render(&self.card_data(product, Some(i + 1))));
            cards.push(Arc::new(card));
        }
        *lock(&self.cards) = cards;

        self.page.set_catalog(mounted);
        self.page.set_notice(None);
        if !self.modal.is_open() {
            self.show(self.page.refresh());
        }
        Ok(())
    }

    fn on_card_select(&self, event: &Event) -> anyhow::Result<()> {
        if let Event::CardSelect(product) = event {
            self.state.set_preview(&product.id)?;
        }
        Ok(())
    }

    fn on_preview_changed(&self, event: &Event) -> anyhow::Result<()> {
        if let Event::PreviewChanged(product) = event {
            let card = self.preview.render(&self.card_data(product.clone(), None));
            self.show(self.modal.render(&card));
        }
        Ok(())
    }

    fn on_card_add(&self, event: &Event) -> anyhow::Result<()> {
        if let Event::CardAdd(product) = event {
            self.state.add_to_basket(product.clone());
            self.modal.close();
        }
        Ok(())
    }

    fn on_card_remove(&self, event: &Event) -> anyhow::Result<()> {
        if let Event::CardRemove { id } = event {
            self.state.remove_from_basket(id);
        }
        Ok(())
    }

    fn on_basket_changed(&self, event: &Event) -> anyhow::Result<()> {
        let Event::BasketChanged(snapshot) = event else {
            return Ok(());
        };
        self.page.set_counter(snapshot.count());
        self.render_catalog();
        let basket = self.basket.render(&BasketViewData::from(snapshot));

        let refreshed = match self.modal.showing() {
            Some("basket") => self.modal.replace(basket),
            Some("card") => self.preview.product().and_then(|product| {
                let card = self.preview.render(&self.card_data(product, None));
                self.modal.replace(card)
            }),
            Some(_) => None,
            None => Some(self.page.refresh()),
        };
        if let Some(mounted) = refreshed {
            self.show(mounted);
        }
        Ok(())
    }

    fn on_basket_open(&self, _: &Event) -> anyhow::Result<()> {
        let snapshot = self.state.basket_snapshot();
        let basket = self.basket.render(&BasketViewData::from(&snapshot));
        self.show(self.modal.render(&basket));
        Ok(())
    }

    fn on_order_open(&self, _: &Event) -> anyhow::Result<()> {
        let form = self.state.order_form();
        let valid = validation::validate(&form).subset(&ORDER_STEP).is_empty();
        let mounted = self.order_form.render(&OrderFormData {
            payment: form.payment,
            address: form.address,
            valid,
            errors: String::new(),
        });
        self.show(self.modal.render(&mounted));
        Ok(())
    }

    fn on_contacts_open(&self, _: &Event) -> anyhow::Result<()> {
        let form = self.state.order_form();
        let valid = validation::validate(&form).subset(&CONTACTS_STEP).is_empty();
        let mounted = self.contacts.render(&ContactsFormData {
            email: form.email,
            phone: form.phone,
            valid,
            errors: String::new(),
        });
        self.show(self.modal.render(&mounted));
        Ok(())
    }

    fn on_field_changed(&self, event: &Event) -> anyhow::Result<()> {
        match event {
            Event::PaymentChanged { payment } => self
                .state
                .update_field(OrderField::Payment, payment.map(Payment::as_str).unwrap_or_default()),
            Event::AddressChanged { address } => {
                self.state.update_field(OrderField::Address, address)
            }
            Event::EmailChanged { email } => self.state.update_field(OrderField::Email, email),
            Event::PhoneChanged { phone } => self.state.update_field(OrderField::Phone, phone),
            _ => {}
        }
        Ok(())
    }

    fn on_form_errors(&self, event: &Event) -> anyhow::Result<()> {
        let Event::FormErrorsChanged(errors) = event else {
            return Ok(());
        };
        self.order_form.set_validity(
            errors.subset(&ORDER_STEP).is_empty(),
            errors.summary(&ORDER_STEP),
        );
        self.contacts.set_validity(
            errors.subset(&CONTACTS_STEP).is_empty(),
            errors.summary(&CONTACTS_STEP),
        );

        let refreshed = match self.modal.showing() {
            Some("order") => self.modal.replace(self.order_form.refresh()),
            Some("contacts") => self.modal.replace(self.contacts.refresh()),
            _ => None,
        };
        if let Some(mounted) = refreshed {
            self.show(mounted);
        }
        Ok(())
    }

    fn on_order_submit(&self, _: &Event) -> anyhow::Result<()> {
        match self.state.prepare_order() {
            Ok(order) => {
                tracing::info!(items = order.items.len(), total = order.total, "order queued");
                self.queue(Effect::SubmitOrder(order));
            }
            Err(e) => {
                tracing::error!(error = %e, "order submitted before the form was complete");
                self.contacts.fail(&e.to_string());
                let errors = validation::validate(&self.state.order_form());
                self.bus.emit(Event::FormErrorsChanged(errors));
            }
        }
        Ok(())
    }

    fn on_order_success(&self, event: &Event) -> anyhow::Result<()> {
        if let Event::OrderSuccess(result) = event {
            self.page.set_notice(None);
            let mounted = self.success.render(&SuccessData {
                order_id: result.id.clone(),
                total: result.total,
            });
            self.show(self.modal.render(&mounted));
        }
        Ok(())
    }

    fn on_request_failed(&self, event: &Event) -> anyhow::Result<()> {
        let Event::RequestFailed { request, message } = event else {
            return Ok(());
        };
        self.page.set_notice(Some(message.clone()));

        let refreshed = match self.modal.showing() {
            Some("contacts") if *request == Request::Order => {
                self.contacts.fail(message);
                self.modal.replace(self.contacts.refresh())
            }
            Some(_) => None,
            None => Some(self.page.refresh()),
        };
        if let Some(mounted) = refreshed {
            self.show(mounted);
        }
        Ok(())
    }

    fn on_modal_open(&self, _: &Event) -> anyhow::Result<()> {
        self.page.set_locked(true);
        Ok(())
    }

    fn on_modal_close(&self, _: &Event) -> anyhow::Result<()> {
        self.page.set_locked(false);
        self.modal.clear();
        self.show(self.page.refresh());
        Ok(())
    }
}

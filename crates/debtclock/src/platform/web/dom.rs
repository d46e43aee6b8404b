//! Page elements the widget writes into.

use debtclock_core::{RenderTarget, Slot};
use web_sys::{Document, Element};

pub const AMOUNT_ID: &str = "debt-amount";
pub const DATE_ID: &str = "last-updated-date";
pub const SOURCE_ID: &str = "data-source";

/// Elements bound by id. Only the amount element is required.
pub struct DomSurface {
    amount: Element,
    date: Option<Element>,
    source: Option<Element>,
}

impl DomSurface {
    /// Bind the widget's elements, or `None` when `#debt-amount` is missing.
    pub fn bind(document: &Document) -> Option<Self> {
        let amount = document.get_element_by_id(AMOUNT_ID)?;
        let date = document.get_element_by_id(DATE_ID);
        let source = document.get_element_by_id(SOURCE_ID);

        tracing::info!(
            date = date.is_some(),
            source = source.is_some(),
            "Widget elements found"
        );

        Some(Self {
            amount,
            date,
            source,
        })
    }

    fn element(&self, slot: Slot) -> Option<&Element> {
        match slot {
            Slot::Amount => Some(&self.amount),
            Slot::Date => self.date.as_ref(),
            Slot::Source => self.source.as_ref(),
        }
    }
}

impl RenderTarget for DomSurface {
    fn write_text(&self, slot: Slot, text: &str) {
        if let Some(element) = self.element(slot) {
            element.set_text_content(Some(text));
        }
    }

    fn write_markup(&self, slot: Slot, markup: &str) {
        if let Some(element) = self.element(slot) {
            element.set_inner_html(markup);
        }
    }
}

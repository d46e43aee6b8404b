//! Web entry point for the debt widget.
//!
//! Binds the page elements, defers the first refresh by one timer turn so
//! page scripts can call `applyDebtWidgetConfig` first, and exports the
//! manual trigger and configuration functions to JavaScript.
//!
//! Pages that insert the widget markup late get a second chance: a few
//! seconds after load the amount element is checked again and the widget is
//! started (or refreshed) if it still shows nothing.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use debtclock_core::{ConfigOverride, CycleOutcome, DebtWidget, WidgetConfig};
use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::DocumentReadyState;

use crate::platform::web::{
    AMOUNT_ID, DATE_ID, DomSurface, FetchTransport, GlooSleeper, PerformanceClock, SOURCE_ID,
};

type Widget = DebtWidget<DomSurface, PerformanceClock>;

/// Delay before the late-markup check
const BACKUP_START_MS: u32 = 3000;

/// Text pages commonly put in the amount element before the first figure
const PLACEHOLDER_TEXT: &str = "Loading...";

thread_local! {
    static APP: RefCell<Option<Rc<WebApp>>> = const { RefCell::new(None) };
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Widget state shared by timers, frame callbacks and exported functions.
struct WebApp {
    widget: RefCell<Widget>,
    /// Reused `requestAnimationFrame` callback
    frame_callback: RefCell<Option<Closure<dyn FnMut()>>>,
    frame_scheduled: Cell<bool>,
    /// Refresh cycles whose fetch has not finished yet
    in_flight: Cell<u32>,
    auto_refresh: RefCell<Option<Interval>>,
    scheduled_interval_ms: Cell<Option<u64>>,
}

impl WebApp {
    fn new(widget: Widget) -> Rc<Self> {
        let app = Rc::new(Self {
            widget: RefCell::new(widget),
            frame_callback: RefCell::new(None),
            frame_scheduled: Cell::new(false),
            in_flight: Cell::new(0),
            auto_refresh: RefCell::new(None),
            scheduled_interval_ms: Cell::new(None),
        });

        let weak = Rc::downgrade(&app);
        *app.frame_callback.borrow_mut() = Some(Closure::new(move || {
            if let Some(app) = weak.upgrade() {
                app.on_frame();
            }
        }));

        app
    }

    /// Start a refresh cycle; the fetch continues in the background.
    fn refresh(self: &Rc<Self>) {
        let cycle = self.widget.borrow_mut().begin_cycle();
        self.sync_auto_refresh();

        self.in_flight.set(self.in_flight.get() + 1);
        let app = Rc::clone(self);
        spawn_local(async move {
            let resolution = cycle.chain.resolve(&FetchTransport, &GlooSleeper).await;
            app.in_flight.set(app.in_flight.get().saturating_sub(1));
            let outcome = app.widget.borrow_mut().complete_cycle(cycle.id, resolution);
            if let CycleOutcome::Applied(_) = outcome {
                app.schedule_frame();
            }
        });
    }

    fn schedule_frame(&self) {
        if self.frame_scheduled.replace(true) {
            return;
        }
        let callback = self.frame_callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };
        let requested = web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))
            .and_then(|window| {
                window.request_animation_frame(callback.as_ref().unchecked_ref())
            });
        if let Err(e) = requested {
            tracing::error!(error = ?e, "requestAnimationFrame failed");
            self.frame_scheduled.set(false);
        }
    }

    fn on_frame(&self) {
        self.frame_scheduled.set(false);
        let more = self.widget.borrow_mut().frame();
        if more {
            self.schedule_frame();
        }
    }

    /// Match the repeating timer to the configuration now in effect.
    fn sync_auto_refresh(self: &Rc<Self>) {
        let refresh = self.widget.borrow().config().refresh.clone();
        let wanted = refresh.auto_refresh.then_some(refresh.interval_ms);
        if wanted == self.scheduled_interval_ms.get() {
            return;
        }

        let interval = wanted.map(|ms| {
            let weak: Weak<Self> = Rc::downgrade(self);
            let millis = u32::try_from(ms).unwrap_or(u32::MAX);
            Interval::new(millis, move || {
                if let Some(app) = weak.upgrade() {
                    tracing::info!("Auto-refresh triggered");
                    app.refresh();
                }
            })
        });

        match wanted {
            Some(ms) => tracing::info!(interval_minutes = ms / 60_000, "Auto-refresh enabled"),
            None => tracing::info!("Auto-refresh disabled"),
        }
        // Replacing the old interval cancels it
        *self.auto_refresh.borrow_mut() = interval;
        self.scheduled_interval_ms.set(wanted);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackupStart {
    /// The widget never started; try binding again
    Start,
    /// Running, idle, and still blank; run another cycle
    Refresh,
    Nothing,
}

/// Decide what the late-markup check does.
///
/// `app_in_flight` is `None` when the widget is not running, otherwise
/// whether a fetch is still outstanding. `amount_text` is `None` while the
/// amount element is absent from the page.
fn backup_start(app_in_flight: Option<bool>, amount_text: Option<&str>) -> BackupStart {
    let Some(text) = amount_text.map(str::trim) else {
        return BackupStart::Nothing;
    };
    if !text.is_empty() && text != PLACEHOLDER_TEXT {
        return BackupStart::Nothing;
    }
    match app_in_flight {
        None => BackupStart::Start,
        Some(false) => BackupStart::Refresh,
        // The pending fetch will fill it in
        Some(true) => BackupStart::Nothing,
    }
}

fn run_backup_start() {
    let amount_text = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(AMOUNT_ID))
        .map(|element| element.text_content().unwrap_or_default());
    let app = APP.with(|slot| slot.borrow().clone());
    let in_flight = app.as_ref().map(|app| app.in_flight.get() > 0);

    match backup_start(in_flight, amount_text.as_deref()) {
        BackupStart::Start => {
            tracing::info!("Backup initialization triggered");
            if let Err(e) = start_widget() {
                tracing::error!(error = ?e, "Failed to start debt widget");
            }
        }
        BackupStart::Refresh => {
            if let Some(app) = app {
                tracing::info!("Backup refresh triggered");
                app.refresh();
            }
        }
        BackupStart::Nothing => {}
    }
}

fn current_app() -> Result<Rc<WebApp>, JsValue> {
    APP.with(|slot| slot.borrow().clone())
        .ok_or_else(|| JsValue::from_str("debt widget is not running"))
}

/// Run one refresh cycle now.
#[wasm_bindgen(js_name = refreshDebtWidget)]
pub fn refresh_debt_widget() -> Result<(), JsValue> {
    tracing::info!("Manual refresh triggered");
    current_app()?.refresh();
    Ok(())
}

/// The configuration the next refresh cycle will use, as JSON.
#[wasm_bindgen(js_name = debtWidgetConfig)]
pub fn debt_widget_config() -> Result<String, JsValue> {
    current_app()?
        .widget
        .borrow()
        .next_config()
        .to_json()
        .map_err(to_js)
}

/// Queue a JSON override, applied when the next refresh cycle starts.
#[wasm_bindgen(js_name = applyDebtWidgetConfig)]
pub fn apply_debt_widget_config(json: &str) -> Result<(), JsValue> {
    let overrides = ConfigOverride::from_json(json).map_err(to_js)?;
    current_app()?
        .widget
        .borrow_mut()
        .queue_override(overrides)
        .map_err(to_js)
}

/// The widget's page elements looked up afresh, for debugging page markup.
///
/// Returns `{ debtAmount, lastUpdatedDate, dataSource }` with `null` for
/// elements that are missing.
#[wasm_bindgen(js_name = findDebtWidgetElements)]
pub fn find_debt_widget_elements() -> Result<js_sys::Object, JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let found = js_sys::Object::new();
    for (key, id) in [
        ("debtAmount", AMOUNT_ID),
        ("lastUpdatedDate", DATE_ID),
        ("dataSource", SOURCE_ID),
    ] {
        let element = document
            .get_element_by_id(id)
            .map_or(JsValue::NULL, JsValue::from);
        js_sys::Reflect::set(&found, &JsValue::from_str(key), &element)?;
    }
    Ok(found)
}

fn start_widget() -> Result<(), JsValue> {
    if APP.with(|slot| slot.borrow().is_some()) {
        return Ok(());
    }

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let Some(surface) = DomSurface::bind(&document) else {
        tracing::error!(
            required = "#debt-amount",
            optional = "#last-updated-date, #data-source",
            "Widget elements not found, check the page structure"
        );
        return Ok(());
    };

    let widget =
        DebtWidget::new(WidgetConfig::default(), surface, PerformanceClock::new()).map_err(to_js)?;
    let app = WebApp::new(widget);
    APP.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&app)));

    Timeout::new(0, move || app.refresh()).forget();
    Ok(())
}

/// WASM entry point.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    crate::init_logging_web();

    tracing::info!("Debt widget starting");
    Timeout::new(BACKUP_START_MS, run_backup_start).forget();

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() != DocumentReadyState::Loading {
        return start_widget();
    }

    let on_ready = Closure::<dyn FnMut()>::new(|| {
        if let Err(e) = start_widget() {
            tracing::error!(error = ?e, "Failed to start debt widget");
        }
    });
    document
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
    on_ready.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_at_check_time_does_nothing() {
        assert_eq!(backup_start(None, None), BackupStart::Nothing);
        assert_eq!(backup_start(Some(false), None), BackupStart::Nothing);
    }

    #[test]
    fn test_late_markup_starts_the_widget() {
        assert_eq!(backup_start(None, Some("")), BackupStart::Start);
        assert_eq!(backup_start(None, Some("  Loading...\n")), BackupStart::Start);
    }

    #[test]
    fn test_blank_idle_widget_is_refreshed() {
        assert_eq!(backup_start(Some(false), Some("Loading...")), BackupStart::Refresh);
        assert_eq!(backup_start(Some(true), Some("Loading...")), BackupStart::Nothing);
    }

    #[test]
    fn test_rendered_figure_is_left_alone() {
        assert_eq!(backup_start(None, Some("$36,215,124,313,382")), BackupStart::Nothing);
        assert_eq!(backup_start(Some(false), Some("$36.22T")), BackupStart::Nothing);
    }
}

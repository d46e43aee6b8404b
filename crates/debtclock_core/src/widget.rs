//! Widget controller
//!
//! [`DebtWidget`] binds one display surface and runs refresh cycles against
//! it. A cycle is split in two halves so hosts can run the fetch wherever
//! suits them (a worker thread, a spawned future):
//!
//! 1. [`DebtWidget::begin_cycle`] applies queued overrides and hands out a
//!    [`RefreshCycle`] carrying a fresh id and a snapshot of the source chain.
//! 2. [`DebtWidget::complete_cycle`] renders the resolution, unless a newer
//!    cycle was started in the meantime.
//!
//! [`DebtWidget::refresh`] does both for hosts that can await in place.

use std::rc::Rc;

use crate::animation::{AnimationRequest, Animator, Clock};
use crate::chain::{Resolution, SourceChain};
use crate::config::{ConfigOverride, WidgetConfig};
use crate::error::ConfigError;
use crate::format::{DisplayOptions, format_markup, format_plain};
use crate::model::{CycleId, CycleTracker, DebtRecord, Provenance};
use crate::retry::Sleeper;
use crate::sources::JsonTransport;

/// Addressable parts of the display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Amount,
    Date,
    Source,
}

/// Display surface provided by the host.
///
/// Writes to a slot the host did not bind are ignored.
pub trait RenderTarget {
    fn write_text(&self, slot: Slot, text: &str);
    fn write_markup(&self, slot: Slot, markup: &str);
}

impl<T: RenderTarget + ?Sized> RenderTarget for Rc<T> {
    fn write_text(&self, slot: Slot, text: &str) {
        (**self).write_text(slot, text)
    }

    fn write_markup(&self, slot: Slot, markup: &str) {
        (**self).write_markup(slot, markup)
    }
}

/// Work order for one refresh cycle
#[derive(Debug, Clone)]
pub struct RefreshCycle {
    pub id: CycleId,
    pub chain: SourceChain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The record was rendered
    Applied(Provenance),
    /// A newer cycle started before this one finished; nothing was rendered
    Stale,
}

/// "Updated: June 27, 2025", annotated when the figure is an estimate
pub fn date_label(record: &DebtRecord) -> String {
    let date = record.as_of.strftime("%B %-d, %Y");
    if record.is_estimate() {
        format!("Updated: {date} (Estimated)")
    } else {
        format!("Updated: {date}")
    }
}

pub fn source_label(record: &DebtRecord) -> String {
    format!("Source: {}", record.source_label)
}

fn write_amount<R: RenderTarget>(target: &R, amount: f64, opts: &DisplayOptions) {
    if opts.fixed_width_digits {
        target.write_markup(Slot::Amount, &format_markup(amount, opts));
    } else {
        target.write_text(Slot::Amount, &format_plain(amount, opts));
    }
}

pub struct DebtWidget<R: RenderTarget + 'static, C: Clock> {
    config: WidgetConfig,
    chain: SourceChain,
    pending: Vec<ConfigOverride>,
    target: Rc<R>,
    animator: Animator<C>,
    cycles: CycleTracker,
    record: Option<DebtRecord>,
}

impl<R: RenderTarget + 'static, C: Clock> DebtWidget<R, C> {
    /// Validate the configuration and bind the display surface.
    pub fn new(config: WidgetConfig, target: R, clock: C) -> Result<Self, ConfigError> {
        let chain = SourceChain::from_config(&config)?;
        Ok(Self {
            config,
            chain,
            pending: Vec::new(),
            target: Rc::new(target),
            animator: Animator::new(clock),
            cycles: CycleTracker::new(),
            record: None,
        })
    }

    /// Configuration in effect for the current cycle
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Configuration the next cycle will run with
    pub fn next_config(&self) -> WidgetConfig {
        self.pending
            .iter()
            .fold(self.config.clone(), |config, overrides| {
                config.with_override(overrides)
            })
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    /// Most recently rendered record
    pub fn record(&self) -> Option<&DebtRecord> {
        self.record.as_ref()
    }

    pub fn latest_cycle(&self) -> Option<CycleId> {
        self.cycles.latest()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    /// Queue an override for the next refresh cycle.
    ///
    /// The merged configuration is validated now so a bad override is
    /// reported to whoever supplied it instead of surfacing mid-refresh.
    pub fn queue_override(&mut self, overrides: ConfigOverride) -> Result<(), ConfigError> {
        if overrides.is_empty() {
            return Ok(());
        }
        self.next_config().with_override(&overrides).validate()?;
        self.pending.push(overrides);
        Ok(())
    }

    /// Start a refresh cycle.
    pub fn begin_cycle(&mut self) -> RefreshCycle {
        if !self.pending.is_empty() {
            let config = self.next_config();
            match SourceChain::from_config(&config) {
                Ok(chain) => {
                    tracing::info!(overrides = self.pending.len(), "Applied configuration override");
                    self.config = config;
                    self.chain = chain;
                }
                Err(e) => tracing::error!(error = %e, "Dropping configuration override"),
            }
            self.pending.clear();
        }

        let id = self.cycles.begin();
        tracing::debug!(cycle = id.0, "Refresh cycle started");
        RefreshCycle {
            id,
            chain: self.chain.clone(),
        }
    }

    /// Render a cycle's resolution if that cycle is still the latest.
    pub fn complete_cycle(&mut self, id: CycleId, resolution: Resolution) -> CycleOutcome {
        if !self.cycles.is_current(id) {
            tracing::debug!(
                cycle = id.0,
                latest = self.cycles.latest().map(|latest| latest.0),
                "Discarding stale cycle result"
            );
            return CycleOutcome::Stale;
        }

        let provenance = resolution.record.provenance;
        self.show(resolution.record);
        CycleOutcome::Applied(provenance)
    }

    /// Run one full refresh cycle in place.
    pub async fn refresh<T, S>(&mut self, transport: &T, sleeper: &S) -> CycleOutcome
    where
        T: JsonTransport,
        S: Sleeper,
    {
        let cycle = self.begin_cycle();
        let resolution = cycle.chain.resolve(transport, sleeper).await;
        self.complete_cycle(cycle.id, resolution)
    }

    /// Advance the amount animation by one display frame.
    ///
    /// Returns true while more frames are needed.
    pub fn frame(&mut self) -> bool {
        self.animator.tick()
    }

    fn show(&mut self, record: DebtRecord) {
        self.target.write_text(Slot::Date, &date_label(&record));
        self.target.write_text(Slot::Source, &source_label(&record));

        let request = AnimationRequest::from_config(&self.config.animation, record.amount);
        let opts = self.config.display;
        let target = Rc::clone(&self.target);
        self.record = Some(record);

        self.animator
            .animate(request, move |value| write_amount(&*target, value, &opts));
    }
}

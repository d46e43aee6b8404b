//! Widget controller tests
//!
//! Full refresh cycles against scripted sources, rendered into a recording
//! display surface.

use super::support::{
    RecordingSleeper, RecordingTarget, SNAPSHOT_URL, ScriptedTransport, Write, live_url,
    server_error, test_config, treasury_body,
};
use crate::animation::ManualClock;
use crate::chain::SourceChain;
use crate::config::{ConfigOverride, WidgetConfig};
use crate::error::ConfigError;
use crate::format::{format_markup, format_plain};
use crate::model::{Provenance, SourceKind};
use crate::widget::{CycleOutcome, DebtWidget, Slot};

const FRAME_MS: f64 = 16.0;

fn live_only_config() -> WidgetConfig {
    let mut config = test_config();
    config.snapshot.enabled = false;
    config
}

fn live_transport(config: &WidgetConfig, amount: &str) -> ScriptedTransport {
    ScriptedTransport::new().script(&live_url(config), vec![Ok(treasury_body(amount, "2025-06-27"))])
}

fn run_frames(widget: &mut DebtWidget<RecordingTarget, ManualClock>, clock: &ManualClock) -> usize {
    let mut frames = 0;
    while widget.frame() {
        clock.advance(FRAME_MS);
        frames += 1;
    }
    frames
}

// ============================================================================
// Rendering
// ============================================================================

#[tokio::test]
async fn test_live_refresh_renders_labels_and_animates_amount() {
    let config = live_only_config();
    let transport = live_transport(&config, "36215124313382.16");
    let clock = ManualClock::new();
    let mut widget = DebtWidget::new(config.clone(), RecordingTarget::new(), clock.clone()).unwrap();

    let outcome = widget.refresh(&transport, &RecordingSleeper::new()).await;
    assert_eq!(outcome, CycleOutcome::Applied(Provenance::Live));

    let target = widget.target();
    assert_eq!(
        target.last(Slot::Date),
        Some(Write::Text("Updated: June 27, 2025".to_string()))
    );
    assert_eq!(
        target.last(Slot::Source),
        Some(Write::Text("Source: U.S. Treasury Fiscal Data (live)".to_string()))
    );
    assert!(target.writes_to(Slot::Amount).is_empty());
    assert!(widget.is_animating());

    let frames = run_frames(&mut widget, &clock);
    assert!(frames >= (2000.0 / FRAME_MS) as usize);

    let amounts = widget.target().writes_to(Slot::Amount);
    assert_eq!(
        amounts.first(),
        Some(&Write::Markup(format_markup(
            36_215_124_313_382.16 * 0.9,
            &config.display
        )))
    );
    assert_eq!(
        amounts.last(),
        Some(&Write::Markup(format_markup(36_215_124_313_382.16, &config.display)))
    );
    assert_eq!(widget.record().map(|r| r.amount), Some(36_215_124_313_382.16));
}

#[tokio::test]
async fn test_fallback_refresh_annotates_the_date() {
    let config = test_config();
    let transport = ScriptedTransport::new()
        .script(SNAPSHOT_URL, vec![Err(server_error())])
        .script(&live_url(&config), vec![Err(server_error())]);
    let mut widget =
        DebtWidget::new(config, RecordingTarget::new(), ManualClock::new()).unwrap();

    let outcome = widget.refresh(&transport, &RecordingSleeper::new()).await;

    assert_eq!(outcome, CycleOutcome::Applied(Provenance::Estimated));
    assert_eq!(
        widget.target().last(Slot::Date),
        Some(Write::Text("Updated: June 27, 2025 (Estimated)".to_string()))
    );
    assert_eq!(
        widget.target().last(Slot::Source),
        Some(Write::Text(
            "Source: U.S. Treasury Fiscal Data (last known) (estimated)".to_string()
        ))
    );
}

#[tokio::test]
async fn test_disabled_animation_writes_final_value_immediately() {
    let mut config = live_only_config();
    config.animation.enabled = false;
    config.display.fixed_width_digits = false;
    let transport = live_transport(&config, "1234567.89");
    let mut widget =
        DebtWidget::new(config.clone(), RecordingTarget::new(), ManualClock::new()).unwrap();

    widget.refresh(&transport, &RecordingSleeper::new()).await;

    assert_eq!(
        widget.target().writes_to(Slot::Amount),
        vec![Write::Text("$1,234,567".to_string())]
    );
    assert!(!widget.frame());
}

// ============================================================================
// Stale cycles
// ============================================================================

#[tokio::test]
async fn test_stale_cycle_result_is_discarded() {
    let config = live_only_config();
    let slow = live_transport(&config, "100000000");
    let fast = live_transport(&config, "200000000");
    let sleeper = RecordingSleeper::new();
    let mut widget =
        DebtWidget::new(config, RecordingTarget::new(), ManualClock::new()).unwrap();

    let first = widget.begin_cycle();
    let second = widget.begin_cycle();
    assert!(second.id > first.id);

    let second_result = second.chain.resolve(&fast, &sleeper).await;
    assert_eq!(
        widget.complete_cycle(second.id, second_result),
        CycleOutcome::Applied(Provenance::Live)
    );
    let writes_after_second = widget.target().count();

    let first_result = first.chain.resolve(&slow, &sleeper).await;
    assert_eq!(widget.complete_cycle(first.id, first_result), CycleOutcome::Stale);

    assert_eq!(widget.target().count(), writes_after_second);
    assert_eq!(widget.record().map(|r| r.amount), Some(200_000_000.0));
    assert_eq!(widget.latest_cycle(), Some(second.id));
}

#[tokio::test]
async fn test_new_cycle_cancels_running_animation() {
    let mut config = live_only_config();
    config.display.fixed_width_digits = false;
    let clock = ManualClock::new();
    let sleeper = RecordingSleeper::new();
    let mut widget =
        DebtWidget::new(config.clone(), RecordingTarget::new(), clock.clone()).unwrap();

    widget
        .refresh(&live_transport(&config, "1000000"), &sleeper)
        .await;
    assert!(widget.frame());
    clock.advance(500.0);
    assert!(widget.frame());
    let before = widget.target().writes_to(Slot::Amount).len();

    widget
        .refresh(&live_transport(&config, "5000000"), &sleeper)
        .await;
    run_frames(&mut widget, &clock);

    let amounts = widget.target().writes_to(Slot::Amount);
    let after: Vec<_> = amounts[before..].to_vec();
    let first_final = Write::Text(format_plain(1_000_000.0, &config.display));
    assert!(!after.contains(&first_final));
    assert_eq!(
        after.first(),
        Some(&Write::Text(format_plain(4_500_000.0, &config.display)))
    );
    assert_eq!(
        after.last(),
        Some(&Write::Text(format_plain(5_000_000.0, &config.display)))
    );
}

// ============================================================================
// Overrides
// ============================================================================

#[tokio::test]
async fn test_override_takes_effect_at_next_cycle() {
    let config = live_only_config();
    let transport = live_transport(&config, "36215124313382.16");
    let mut widget =
        DebtWidget::new(config, RecordingTarget::new(), ManualClock::new()).unwrap();

    widget
        .queue_override(ConfigOverride {
            animation_enabled: Some(false),
            abbreviate_trillions: Some(true),
            fixed_width_digits: Some(false),
            ..Default::default()
        })
        .unwrap();
    assert!(widget.config().animation.enabled, "not applied before the cycle");
    assert!(widget.next_config().display.abbreviate_trillions);

    widget.refresh(&transport, &RecordingSleeper::new()).await;

    assert!(!widget.config().animation.enabled);
    assert_eq!(
        widget.target().last(Slot::Amount),
        Some(Write::Text("$36.22T".to_string()))
    );
}

#[tokio::test]
async fn test_override_can_reorder_and_toggle_sources() {
    let config = test_config();
    let live = live_url(&config);
    let transport = live_transport(&config, "1000");
    let sleeper = RecordingSleeper::new();
    let mut widget =
        DebtWidget::new(config, RecordingTarget::new(), ManualClock::new()).unwrap();

    widget
        .queue_override(ConfigOverride {
            snapshot_enabled: Some(false),
            max_retries: Some(0),
            ..Default::default()
        })
        .unwrap();
    let cycle = widget.begin_cycle();

    let kinds: Vec<_> = cycle.chain.sources().iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, vec![SourceKind::Live]);
    let resolution = cycle.chain.resolve(&transport, &sleeper).await;
    assert_eq!(transport.calls(), vec![live]);
    assert_eq!(resolution.record.amount, 1000.0);
}

#[test]
fn test_invalid_override_is_rejected_and_not_queued() {
    let mut widget =
        DebtWidget::new(live_only_config(), RecordingTarget::new(), ManualClock::new()).unwrap();

    let err = widget
        .queue_override(ConfigOverride {
            reduction_fraction: Some(1.5),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err, ConfigError::InvalidReductionFraction(1.5));

    let err = widget
        .queue_override(ConfigOverride {
            snapshot_enabled: Some(true),
            snapshot_url: Some(String::new()),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err, ConfigError::MissingSnapshotUrl);

    assert_eq!(widget.next_config(), *widget.config());
}

#[test]
fn test_widget_rejects_invalid_config() {
    let config = WidgetConfig {
        emergency_fallback: None,
        ..live_only_config()
    };
    let result = DebtWidget::new(config.clone(), RecordingTarget::new(), ManualClock::new());
    assert!(matches!(result, Err(ConfigError::MissingFallback)));
    assert!(SourceChain::from_config(&config).is_err());
}

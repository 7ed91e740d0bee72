//! Presale countdown display.
//!
//! A [`CountdownTimer`] owns its `Interval`; dropping the timer stops the
//! ticks.

use crate::dom::{self, Elements};
use dwat_presale::countdown::{TICK_INTERVAL_MS, display_units};
use dwat_presale::{Countdown, Tick};
use gloo_timers::callback::Interval;

pub struct CountdownTimer {
    _interval: Interval,
}

impl CountdownTimer {
    /// Start ticking towards `end_date` (anything `Date.parse` accepts).
    /// Returns `None` when the date cannot be parsed.
    pub fn start(els: &Elements, end_date: &str) -> Option<CountdownTimer> {
        let target = js_sys::Date::parse(end_date);
        if target.is_nan() {
            gloo_console::warn!(format!("countdown: unparseable end date '{end_date}'"));
            return None;
        }

        let els = els.clone();
        Some(Self::run(target as i64, move |tick| render(&els, tick)))
    }

    /// Call `on_tick` now and then once per tick until the timer is dropped.
    pub fn run(target_ms: i64, mut on_tick: impl FnMut(Tick) + 'static) -> CountdownTimer {
        let mut countdown = Countdown::new(target_ms);
        on_tick(countdown.tick(now_ms()));

        let interval = Interval::new(TICK_INTERVAL_MS, move || on_tick(countdown.tick(now_ms())));
        CountdownTimer {
            _interval: interval,
        }
    }
}

fn now_ms() -> i64 {
    js_sys::Date::now() as i64
}

/// The end date configured on the page, if any.
pub fn configured_end_date(els: &Elements) -> Option<String> {
    dom::data(&els.countdown, "end-date")
}

fn render(els: &Elements, tick: Tick) {
    for (label, value) in display_units(&tick.time_left) {
        for cell in &els.countdown_cells {
            if dom::data(cell, "unit").as_deref() == Some(label) {
                dom::set_text(cell, &value);
            }
        }
    }

    if tick.completed_now {
        gloo_console::log!("presale countdown finished");
        dom::toggle_class(&els.countdown, "ended", true);
        dom::set_text(&els.presale_status, "The presale has ended.");
        els.purchase_btn.set_disabled(true);
    }
}

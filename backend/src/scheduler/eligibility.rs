//! Context tag evaluation
//!
//! Calendar and flag tags are answered from the clock and flag store. Stat
//! band tags need a stat store; without one they fail closed, so a headless
//! or partial setup never shows an event whose preconditions it cannot see.
//! A missing flag store makes every flag tag false.

use super::config::{FlagThreshold, StatBand, TagThresholds};
use super::SchedulingContext;
use crate::models::flags::FlagStore;
use crate::models::stats::{StatKind, StatStore};
use crate::models::tags::ContextTag;

/// Evaluate one required tag for `day`
pub fn tag_matches(
    tag: &ContextTag,
    day: u32,
    ctx: &SchedulingContext<'_>,
    thresholds: &TagThresholds,
) -> bool {
    if tag.needs_stats() {
        return ctx
            .stats
            .is_some_and(|stats| stat_band_matches(tag, stats, thresholds));
    }

    match tag {
        ContextTag::ExamWindow => ctx.clock.is_in_exam_window(day),
        ContextTag::InflationDay => ctx.clock.is_inflation_shock_day(day),
        ContextTag::KykPayday => ctx.clock.is_kyk_payday(day),
        ContextTag::FirstSemester => !ctx.clock.is_second_semester(day),
        ContextTag::SecondSemester => ctx.clock.is_second_semester(day),

        ContextTag::DebtPressure => flag_at_least(ctx.flags, &thresholds.debt_pressure),
        ContextTag::WorkStrain => flag_at_least(ctx.flags, &thresholds.work_strain),
        ContextTag::Burnout => flag_at_least(ctx.flags, &thresholds.burnout),
        ContextTag::KykRisk => flag_at_least(ctx.flags, &thresholds.kyk_risk_days),
        ContextTag::IllegalFinePending => {
            flag_at_least(ctx.flags, &thresholds.illegal_fine_pending)
        }

        ContextTag::KykStatus(expected) => ctx
            .flags
            .and_then(|flags| flags.text(&thresholds.kyk_status_key))
            .is_some_and(|status| status.trim().to_lowercase() == *expected),

        // Stat bands are answered above
        _ => false,
    }
}

/// True when every tag matches
pub fn all_tags_match(
    tags: &[ContextTag],
    day: u32,
    ctx: &SchedulingContext<'_>,
    thresholds: &TagThresholds,
) -> bool {
    tags.iter().all(|tag| tag_matches(tag, day, ctx, thresholds))
}

fn flag_at_least(flags: Option<&dyn FlagStore>, threshold: &FlagThreshold) -> bool {
    flags
        .and_then(|flags| flags.numeric(&threshold.key))
        .is_some_and(|value| value >= threshold.min)
}

fn stat_band_matches(tag: &ContextTag, stats: &dyn StatStore, thresholds: &TagThresholds) -> bool {
    let (kind, band, want_high): (StatKind, &StatBand, bool) = match tag {
        ContextTag::MoneyLow => (StatKind::Money, &thresholds.money, false),
        ContextTag::MoneyHigh => (StatKind::Money, &thresholds.money, true),
        ContextTag::MentalLow => (StatKind::Mental, &thresholds.mental, false),
        ContextTag::MentalHigh => (StatKind::Mental, &thresholds.mental, true),
        ContextTag::EnergyLow => (StatKind::Energy, &thresholds.energy, false),
        ContextTag::EnergyHigh => (StatKind::Energy, &thresholds.energy, true),
        ContextTag::AcademicLow => (StatKind::Academic, &thresholds.academic, false),
        ContextTag::AcademicHigh => (StatKind::Academic, &thresholds.academic, true),
        _ => return false,
    };

    let value = stats.stat(kind);
    if want_high {
        band.is_high(value)
    } else {
        band.is_low(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::{CalendarConfig, DayWindow};
    use crate::core::time::GameClock;
    use crate::models::flags::FlagBook;
    use crate::models::stats::StatSheet;

    fn clock() -> GameClock {
        GameClock::new(CalendarConfig {
            exam_windows: vec![DayWindow::new(5, 6)],
            inflation_shock_days: vec![9],
            ..Default::default()
        })
    }

    #[test]
    fn test_calendar_tags_use_given_day() {
        let clock = clock();
        let ctx = SchedulingContext::new(&clock, None, None);
        let thresholds = TagThresholds::default();

        assert!(tag_matches(&ContextTag::ExamWindow, 5, &ctx, &thresholds));
        assert!(!tag_matches(&ContextTag::ExamWindow, 7, &ctx, &thresholds));
        assert!(tag_matches(&ContextTag::InflationDay, 9, &ctx, &thresholds));
        assert!(tag_matches(&ContextTag::FirstSemester, 9, &ctx, &thresholds));
    }

    #[test]
    fn test_stat_tags_fail_closed_without_stats() {
        let clock = clock();
        let ctx = SchedulingContext::new(&clock, None, None);
        let thresholds = TagThresholds::default();

        assert!(!tag_matches(&ContextTag::MoneyLow, 1, &ctx, &thresholds));
        assert!(!tag_matches(&ContextTag::MoneyHigh, 1, &ctx, &thresholds));
    }

    #[test]
    fn test_stat_bands() {
        let clock = clock();
        let stats = StatSheet::new()
            .with(StatKind::Money, 10.0)
            .with(StatKind::Energy, 70.0);
        let ctx = SchedulingContext::new(&clock, Some(&stats), None);
        let thresholds = TagThresholds::default();

        assert!(tag_matches(&ContextTag::MoneyLow, 1, &ctx, &thresholds));
        assert!(!tag_matches(&ContextTag::MoneyHigh, 1, &ctx, &thresholds));
        assert!(tag_matches(&ContextTag::EnergyHigh, 1, &ctx, &thresholds));
        assert!(!tag_matches(&ContextTag::EnergyLow, 1, &ctx, &thresholds));
    }

    #[test]
    fn test_flag_tags() {
        let clock = clock();
        let mut flags = FlagBook::new();
        flags.set_numeric("burnout", 0.5);
        flags.set_numeric("debt_pressure", 3.0);
        flags.set_text("kyk_status", " Suspended ");
        let ctx = SchedulingContext::new(&clock, None, Some(&flags));
        let thresholds = TagThresholds::default();

        assert!(!tag_matches(&ContextTag::Burnout, 1, &ctx, &thresholds));
        assert!(tag_matches(&ContextTag::DebtPressure, 1, &ctx, &thresholds));
        assert!(!tag_matches(&ContextTag::WorkStrain, 1, &ctx, &thresholds));
        assert!(tag_matches(
            &ContextTag::KykStatus("suspended".to_string()),
            1,
            &ctx,
            &thresholds
        ));
        assert!(!tag_matches(
            &ContextTag::KykStatus("active".to_string()),
            1,
            &ctx,
            &thresholds
        ));
    }

    #[test]
    fn test_every_stat_tag_needs_a_stat_store() {
        let clock = clock();
        let stats = StatSheet::new()
            .with(StatKind::Money, 500.0)
            .with(StatKind::Mental, 10.0)
            .with(StatKind::Academic, 90.0);
        let with_stats = SchedulingContext::new(&clock, Some(&stats), None);
        let without = SchedulingContext::new(&clock, None, None);
        let thresholds = TagThresholds::default();

        for tag in [
            ContextTag::MoneyHigh,
            ContextTag::MentalLow,
            ContextTag::AcademicHigh,
        ] {
            assert!(tag.needs_stats());
            assert!(tag_matches(&tag, 1, &with_stats, &thresholds));
            assert!(!tag_matches(&tag, 1, &without, &thresholds));
        }
    }

    #[test]
    fn test_flag_tags_false_without_flag_store() {
        let clock = clock();
        let ctx = SchedulingContext::new(&clock, None, None);
        assert!(!tag_matches(
            &ContextTag::DebtPressure,
            1,
            &ctx,
            &TagThresholds::default()
        ));
    }
}

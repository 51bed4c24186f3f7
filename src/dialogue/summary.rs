//! Human-readable summary of collected slots

use super::Slots;

/// Render present slots in fixed order, one `Label: value` line each
#[must_use]
pub fn build_summary(slots: &Slots) -> String {
    let lines = [
        ("Anliegen", slots.goal.map(|g| g.as_str().to_string())),
        ("Thema", slots.topic.clone()),
        ("Name", slots.name.clone()),
        ("Kontakt", slots.contact.clone()),
        ("Zeitfenster", slots.timewindow.clone()),
    ];

    lines
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| format!("{label}: {v}")))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::Goal;

    #[test]
    fn test_full_summary_order() {
        let slots = Slots::default()
            .with_timewindow("Dienstag Nachmittag")
            .with_contact("eva@example.de")
            .with_name("Eva Muster")
            .with_topic("Angebot")
            .with_goal(Goal::Booking);

        assert_eq!(
            build_summary(&slots),
            "Anliegen: booking\nThema: Angebot\nName: Eva Muster\nKontakt: eva@example.de\nZeitfenster: Dienstag Nachmittag"
        );
    }

    #[test]
    fn test_missing_slots_are_skipped() {
        let slots = Slots::default().with_goal(Goal::Info).with_name("Jo");
        assert_eq!(build_summary(&slots), "Anliegen: info\nName: Jo");
    }

    #[test]
    fn test_empty_slots_give_empty_summary() {
        assert_eq!(build_summary(&Slots::default()), "");
    }
}

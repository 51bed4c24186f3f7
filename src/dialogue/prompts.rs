//! Fixed replies of the scripted flow (de-DE)

pub const GREETING: &str = "Hi, ich bin dein Everlast Voice Agent. Willst du einen Termin buchen, Infos bekommen oder einen Rückruf anlegen?";

pub const ASK_GOAL_AGAIN: &str = "Sag bitte: Termin, Infos oder Rückruf.";
pub const ASK_TOPIC: &str = "Alles klar. Worum geht es konkret, also welches Thema oder Anliegen?";
pub const ASK_TOPIC_AGAIN: &str =
    "Nenn mir bitte ein kurzes Thema. Zum Beispiel: Beratung, Angebot, Support.";
pub const ASK_NAME: &str = "Wie ist dein Name?";
pub const ASK_NAME_AGAIN: &str = "Sag bitte deinen Namen nochmal.";

/// Sent when the flow enters contact entry
pub const ASK_CONTACT: &str = "Bitte gib jetzt deine E-Mail oder Telefonnummer in das Eingabefeld ein. Sprache ist hier deaktiviert.";
/// Sent when spoken input reaches contact entry
pub const ASK_CONTACT_TYPED: &str = "Bitte gib deine E-Mail oder Telefonnummer in das Eingabefeld ein. Sprache ist hier deaktiviert.";
pub const CONTACT_ACCEPTED: &str = "Danke dir. Nenn mir bitte zuerst ein Datum oder einen Wochentag und danach die passende Uhrzeit oder Tageszeit.";

pub const ASK_TIMEWINDOW_AGAIN: &str =
    "Nenn mir bitte ein grobes Zeitfenster, zum Beispiel Montag Vormittag.";

pub const CONFIRMED: &str = "Perfekt. Ich habe es aufgenommen. Du kannst die Zusammenfassung kopieren und intern weitergeben.";
pub const REJECTED: &str = "Alles klar. Dann starten wir beim Thema neu. Worum geht es konkret?";
pub const CONFIRM_AGAIN: &str = "Sag bitte ja oder nein. Passt die Zusammenfassung so?";
pub const DONE: &str = "Wenn du noch etwas brauchst, sag einfach: neuer Termin.";
pub const RESTART: &str = "Lass uns neu starten. Willst du Termin, Infos oder Rückruf?";

/// Reply of the scripted-turn endpoint when a request cannot be handled
pub const SERVER_ERROR: &str = "server error";

#[must_use]
pub fn confirmation(summary: &str) -> String {
    format!("Kurz zur Bestätigung:\n{summary}\n\nPasst das so? Sag ja oder nein.")
}

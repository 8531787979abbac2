//! Markup for chat messages and the medicine information card.

use super::{ChatMessage, Sender};
use crate::api::models::MedicineInfo;
use crate::utils::escape_html;

/// Renders one message bubble. All text is escaped.
pub fn render_message(message: &ChatMessage, disclaimer: &str) -> String {
    let text = escape_html(&message.text);
    match message.sender {
        Sender::User => format!(
            r#"<div class="message user"><p class="text-sm">{}</p></div>"#,
            text
        ),
        Sender::Bot => {
            let mut content = format!(r#"<p class="text-sm text-gray-800">{}</p>"#, text);
            if let Some(info) = &message.medicine_info {
                content.push_str(&render_medicine_card(info, disclaimer));
            }
            format!(r#"<div class="message bot">{}</div>"#, content)
        }
    }
}

/// Lists whatever facts are present, then the disclaimer, which is always
/// shown.
pub fn render_medicine_card(info: &MedicineInfo, disclaimer: &str) -> String {
    let mut card = String::from(r#"<div class="medicine-card">"#);
    card.push_str("<h4>📋 Medicine Information</h4>");

    if let Some(generic) = info.generic_name.as_deref().filter(|g| !g.is_empty()) {
        push_fact(&mut card, "Generic Name", generic, false);
    }
    push_list(&mut card, "Brand Names", &info.brand_names, false);
    push_list(&mut card, "Uses", &info.uses, false);
    if let Some(adults) = info
        .dosage
        .as_ref()
        .and_then(|dosage| dosage.adults.as_deref())
        .filter(|a| !a.is_empty())
    {
        push_fact(&mut card, "Adult Dosage", adults, false);
    }
    push_list(&mut card, "Side Effects", &info.side_effects, false);
    push_list(&mut card, "⚠️ Warnings", &info.warnings, true);

    card.push_str(&format!(
        r#"<p class="disclaimer">{}</p>"#,
        escape_html(disclaimer)
    ));
    card.push_str("</div>");
    card
}

fn push_list(card: &mut String, label: &str, items: &[String], warning: bool) {
    if !items.is_empty() {
        push_fact(card, label, &items.join(", "), warning);
    }
}

fn push_fact(card: &mut String, label: &str, value: &str, warning: bool) {
    let class = if warning { "text-red-600" } else { "text-gray-700" };
    card.push_str(&format!(
        r#"<p class="{}"><strong>{}:</strong> {}</p>"#,
        class,
        label,
        escape_html(value)
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Dosage;

    const DISCLAIMER: &str = "Always consult healthcare professionals.";

    #[test]
    fn user_text_is_escaped() {
        let message = ChatMessage::user("<script>alert('x')</script>");
        let html = render_message(&message, DISCLAIMER);
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn card_shows_present_fields_only() {
        let info = MedicineInfo {
            generic_name: Some("Ibuprofen".into()),
            brand_names: vec!["Advil".into(), "Motrin".into()],
            uses: vec![],
            dosage: Some(Dosage {
                adults: Some("200-400 mg every 4-6 hours".into()),
                children: None,
            }),
            side_effects: vec![],
            warnings: vec!["Take with food".into()],
        };
        let card = render_medicine_card(&info, DISCLAIMER);
        assert!(card.contains("<strong>Generic Name:</strong> Ibuprofen"));
        assert!(card.contains("<strong>Brand Names:</strong> Advil, Motrin"));
        assert!(card.contains("<strong>Adult Dosage:</strong> 200-400 mg every 4-6 hours"));
        assert!(card.contains("Take with food"));
        assert!(!card.contains("Uses:"));
        assert!(!card.contains("Side Effects:"));
        assert!(card.contains(DISCLAIMER));
    }

    #[test]
    fn empty_card_still_has_disclaimer() {
        let card = render_medicine_card(&MedicineInfo::default(), DISCLAIMER);
        assert!(card.contains(DISCLAIMER));
        assert!(!card.contains("<strong>"));
    }

    #[test]
    fn card_escapes_service_text() {
        let info = MedicineInfo {
            uses: vec!["pain & fever".into()],
            ..MedicineInfo::default()
        };
        let mut message = ChatMessage::bot("Here you go");
        message.medicine_info = Some(info);
        let html = render_message(&message, DISCLAIMER);
        assert!(html.contains("pain &amp; fever"));
    }
}

//! One-shot page decoration: hover and focus styling, live field
//! validation, smooth scrolling and the global dismiss handlers.
//!
//! Every step looks up its own elements and does nothing when a page does
//! not have them.

use crate::ui::{Behavior, Document, EventKind, Scope, Target};

pub const TRUST_MARKER: &str = ".TrustMarkerHeroComponent_gradientBorderBackground___42bi";
const FORM_FIELDS: &str = "input, select, textarea";
const ANIMATED: &str = ".float-anim, .animate-pulse, .animate-bounce";
const MENU_TOGGLE: &str = r#"[aria-label="Toggle menu"]"#;
const MOBILE_MENU: &str = ".mobile-menu";

/// How many elements each step decorated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InitReport {
    pub trust_markers: usize,
    pub form_fields: usize,
    pub buttons: usize,
    pub table_rows: usize,
    pub anchors: usize,
    pub mobile_menu: bool,
    pub animated: usize,
    pub active_pages: usize,
}

const fn style(
    scope: Scope,
    declarations: &'static [(&'static str, &'static str)],
) -> Behavior {
    Behavior::Style {
        scope,
        declarations,
    }
}

#[derive(Debug, Default)]
pub struct PageInitializer;

impl PageInitializer {
    pub fn new() -> Self {
        Self
    }

    /// Runs every step against `doc`.
    pub fn run(&self, doc: &mut Document) -> InitReport {
        log::info!("Page initialization started");
        let report = InitReport {
            trust_markers: self.trust_markers(doc),
            form_fields: self.form_fields(doc),
            buttons: self.buttons(doc),
            table_rows: self.table_rows(doc),
            anchors: self.anchors(doc),
            mobile_menu: self.mobile_menu(doc),
            animated: self.animations(doc),
            active_pages: self.pages(doc),
        };
        self.global_handlers(doc);
        log::info!("Page initialization finished: {:?}", report);
        report
    }

    fn trust_markers(&self, doc: &mut Document) -> usize {
        let markers = doc.select(TRUST_MARKER);
        for &marker in &markers {
            let target = Target::Element(marker);
            doc.listen(
                target,
                EventKind::PointerEnter,
                style(
                    Scope::Current,
                    &[
                        ("transform", "scale(1.05)"),
                        ("box-shadow", "0 20px 40px rgba(0, 0, 0, 0.3)"),
                    ],
                ),
            );
            doc.listen(
                target,
                EventKind::PointerLeave,
                style(Scope::Current, &[("transform", "scale(1)"), ("box-shadow", "")]),
            );
            doc.listen(
                target,
                EventKind::PointerDown,
                style(Scope::Current, &[("transform", "scale(0.95)")]),
            );
            doc.listen(
                target,
                EventKind::PointerUp,
                style(Scope::Current, &[("transform", "scale(1.05)")]),
            );
        }
        markers.len()
    }

    fn form_fields(&self, doc: &mut Document) -> usize {
        let fields = doc.select(FORM_FIELDS);
        for &field in &fields {
            let target = Target::Element(field);
            doc.listen(
                target,
                EventKind::Focus,
                style(
                    Scope::Parent,
                    &[("transform", "scale(1.02)"), ("border-color", "#10b981")],
                ),
            );
            doc.listen(
                target,
                EventKind::Blur,
                style(
                    Scope::Parent,
                    &[
                        ("transform", "scale(1)"),
                        ("border-color", "rgba(255, 255, 255, 0.2)"),
                    ],
                ),
            );
            doc.listen(target, EventKind::Input, Behavior::ValidityClasses);
        }
        fields.len()
    }

    fn buttons(&self, doc: &mut Document) -> usize {
        let buttons = doc.select("button");
        for &button in &buttons {
            let target = Target::Element(button);
            doc.listen(
                target,
                EventKind::PointerEnter,
                style(
                    Scope::Current,
                    &[
                        ("transform", "translateY(-2px)"),
                        ("box-shadow", "0 10px 25px rgba(0, 0, 0, 0.2)"),
                    ],
                ),
            );
            doc.listen(
                target,
                EventKind::PointerLeave,
                style(
                    Scope::Current,
                    &[("transform", "translateY(0)"), ("box-shadow", "")],
                ),
            );
            doc.listen(
                target,
                EventKind::PointerDown,
                style(Scope::Current, &[("transform", "scale(0.95)")]),
            );
            doc.listen(
                target,
                EventKind::PointerUp,
                style(Scope::Current, &[("transform", "scale(1)")]),
            );
        }
        buttons.len()
    }

    fn table_rows(&self, doc: &mut Document) -> usize {
        let rows = doc.select("tbody tr");
        for &row in &rows {
            doc.listen(
                Target::Element(row),
                EventKind::PointerEnter,
                style(
                    Scope::Current,
                    &[("background-color", "rgba(16, 185, 129, 0.1)")],
                ),
            );
            doc.listen(
                Target::Element(row),
                EventKind::PointerLeave,
                style(Scope::Current, &[("background-color", "")]),
            );
        }
        rows.len()
    }

    fn anchors(&self, doc: &mut Document) -> usize {
        let links = doc.select(r##"a[href^="#"]"##);
        for &link in &links {
            doc.listen(Target::Element(link), EventKind::Click, Behavior::SmoothScroll);
        }
        links.len()
    }

    /// Wires the first menu toggle to the mobile menu, if both exist.
    fn mobile_menu(&self, doc: &mut Document) -> bool {
        let toggle = doc.select(MENU_TOGGLE).first().copied();
        let menu_exists = !doc.select(MOBILE_MENU).is_empty();
        match toggle {
            Some(toggle) if menu_exists => {
                doc.listen(
                    Target::Element(toggle),
                    EventKind::Click,
                    Behavior::ToggleClass {
                        selector: MOBILE_MENU,
                        class: "hidden",
                    },
                );
                true
            }
            _ => false,
        }
    }

    /// Staggers animated elements by 0.2s each, in document order.
    fn animations(&self, doc: &mut Document) -> usize {
        let animated = doc.select(ANIMATED);
        for (index, &element) in animated.iter().enumerate() {
            let delay = format!("{}s", (index * 2) as f64 / 10.0);
            doc.set_style(element, "animation-delay", &delay);
        }
        animated.len()
    }

    fn pages(&self, doc: &mut Document) -> usize {
        let active = doc.select(".page.active");
        for &page in &active {
            doc.set_style(page, "animation", "fadeIn 0.5s ease-in-out");
        }
        active.len()
    }

    fn global_handlers(&self, doc: &mut Document) {
        doc.listen(Target::Document, EventKind::Click, Behavior::CloseDropdowns);
        doc.listen(Target::Document, EventKind::KeyDown, Behavior::DismissModals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{ElementId, Event};

    struct Page {
        doc: Document,
        marker: ElementId,
        wrapper: ElementId,
        email: ElementId,
        button: ElementId,
        row: ElementId,
        link: ElementId,
        section: ElementId,
        toggle: ElementId,
        menu: ElementId,
        dropdown_toggle: ElementId,
        dropdown: ElementId,
        modal: ElementId,
    }

    fn full_page() -> Page {
        let mut doc = Document::new();
        let body = doc.body();

        let marker = doc.append(body, "div");
        doc.add_class(marker, "TrustMarkerHeroComponent_gradientBorderBackground___42bi");

        let wrapper = doc.append(body, "div");
        let email = doc.append(wrapper, "input");
        doc.set_attr(email, "type", "email").set_attr(email, "required", "");

        let button = doc.append(body, "button");

        let table = doc.append(body, "table");
        let tbody = doc.append(table, "tbody");
        let row = doc.append(tbody, "tr");

        let link = doc.append(body, "a");
        doc.set_attr(link, "href", "#records");
        let section = doc.append(body, "section");
        doc.set_id(section, "records");

        let toggle = doc.append(body, "span");
        doc.set_attr(toggle, "aria-label", "Toggle menu");
        let menu = doc.append(body, "nav");
        doc.add_class(menu, "mobile-menu").add_class(menu, "hidden");

        let nav = doc.append(body, "div");
        let dropdown_toggle = doc.append(nav, "span");
        let dropdown = doc.append(nav, "ul");
        doc.add_class(dropdown, "dropdown");

        let modal = doc.append(body, "div");
        doc.add_class(modal, "modal").add_class(modal, "show");

        for class in ["float-anim", "animate-pulse", "animate-bounce", "float-anim"] {
            let element = doc.append(body, "div");
            doc.add_class(element, class);
        }

        Page {
            doc,
            marker,
            wrapper,
            email,
            button,
            row,
            link,
            section,
            toggle,
            menu,
            dropdown_toggle,
            dropdown,
            modal,
        }
    }

    #[test]
    fn empty_page_is_a_no_op() {
        let mut doc = Document::new();
        let report = PageInitializer::new().run(&mut doc);
        assert_eq!(report, InitReport::default());
        assert_eq!(doc.listener_count(), 2);

        doc.dispatch(doc.body(), Event::Click);
        doc.dispatch(doc.body(), Event::KeyDown("Escape".into()));
    }

    #[test]
    fn report_counts_each_step() {
        let mut page = full_page();
        let report = PageInitializer::new().run(&mut page.doc);
        assert_eq!(
            report,
            InitReport {
                trust_markers: 1,
                form_fields: 1,
                buttons: 1,
                table_rows: 1,
                anchors: 1,
                mobile_menu: true,
                animated: 4,
                active_pages: 0,
            }
        );
    }

    #[test]
    fn hover_and_press_styles() {
        let mut page = full_page();
        PageInitializer::new().run(&mut page.doc);
        let doc = &mut page.doc;

        doc.dispatch(page.marker, Event::PointerEnter);
        assert_eq!(doc.style(page.marker, "transform"), Some("scale(1.05)"));
        doc.dispatch(page.marker, Event::PointerLeave);
        assert_eq!(doc.style(page.marker, "transform"), Some("scale(1)"));

        doc.dispatch(page.button, Event::PointerEnter);
        assert_eq!(doc.style(page.button, "transform"), Some("translateY(-2px)"));
        doc.dispatch(page.button, Event::PointerDown);
        assert_eq!(doc.style(page.button, "transform"), Some("scale(0.95)"));

        doc.dispatch(page.row, Event::PointerEnter);
        assert_eq!(
            doc.style(page.row, "background-color"),
            Some("rgba(16, 185, 129, 0.1)")
        );
    }

    #[test]
    fn focus_styles_parent_and_input_validates() {
        let mut page = full_page();
        PageInitializer::new().run(&mut page.doc);
        let doc = &mut page.doc;

        doc.dispatch(page.email, Event::Focus);
        assert_eq!(doc.style(page.wrapper, "transform"), Some("scale(1.02)"));
        assert_eq!(doc.style(page.wrapper, "border-color"), Some("#10b981"));
        doc.dispatch(page.email, Event::Blur);
        assert_eq!(
            doc.style(page.wrapper, "border-color"),
            Some("rgba(255, 255, 255, 0.2)")
        );

        doc.set_value(page.email, "not-an-email");
        doc.dispatch(page.email, Event::Input);
        assert!(doc.has_class(page.email, "border-red-500"));

        doc.set_value(page.email, "staff@medicos.in");
        doc.dispatch(page.email, Event::Input);
        assert!(doc.has_class(page.email, "border-green-500"));
        assert!(!doc.has_class(page.email, "border-red-500"));

        doc.set_value(page.email, "");
        doc.dispatch(page.email, Event::Input);
        assert!(!doc.has_class(page.email, "border-red-500"));
        assert!(!doc.has_class(page.email, "border-green-500"));
    }

    #[test]
    fn navigation_behaviours() {
        let mut page = full_page();
        PageInitializer::new().run(&mut page.doc);
        let doc = &mut page.doc;

        doc.dispatch(page.link, Event::Click);
        assert_eq!(doc.scrolled_to(), Some(page.section));

        doc.dispatch(page.toggle, Event::Click);
        assert!(!doc.has_class(page.menu, "hidden"));
        doc.dispatch(page.toggle, Event::Click);
        assert!(doc.has_class(page.menu, "hidden"));
    }

    #[test]
    fn animation_delays_are_staggered() {
        let mut page = full_page();
        PageInitializer::new().run(&mut page.doc);
        let delays: Vec<_> = page
            .doc
            .select(ANIMATED)
            .into_iter()
            .map(|id| page.doc.style(id, "animation-delay").map(str::to_string))
            .collect();
        assert_eq!(
            delays,
            vec![
                Some("0s".to_string()),
                Some("0.2s".to_string()),
                Some("0.4s".to_string()),
                Some("0.6s".to_string())
            ]
        );
    }

    #[test]
    fn outside_click_closes_dropdowns() {
        let mut page = full_page();
        PageInitializer::new().run(&mut page.doc);
        let doc = &mut page.doc;

        doc.dispatch(page.dropdown_toggle, Event::Click);
        assert!(!doc.has_class(page.dropdown, "hidden"));
        doc.dispatch(page.dropdown, Event::Click);
        assert!(!doc.has_class(page.dropdown, "hidden"));

        doc.dispatch(page.button, Event::Click);
        assert!(doc.has_class(page.dropdown, "hidden"));
    }

    #[test]
    fn escape_dismisses_modals() {
        let mut page = full_page();
        PageInitializer::new().run(&mut page.doc);
        let doc = &mut page.doc;

        doc.dispatch(doc.body(), Event::KeyDown("Enter".into()));
        assert!(doc.has_class(page.modal, "show"));
        doc.dispatch(doc.body(), Event::KeyDown("Escape".into()));
        assert!(!doc.has_class(page.modal, "show"));
    }
}

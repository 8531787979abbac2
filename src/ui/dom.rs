//! A small element tree standing in for the page the controllers decorate.

use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Clone, Debug, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub style: BTreeMap<String, String>,
    pub attrs: BTreeMap<String, String>,
    pub value: String,
    pub disabled: bool,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    PointerEnter,
    PointerLeave,
    PointerDown,
    PointerUp,
    Focus,
    Blur,
    Input,
    Click,
    KeyDown,
}

impl EventKind {
    fn bubbles(self) -> bool {
        matches!(
            self,
            Self::PointerDown | Self::PointerUp | Self::Input | Self::Click | Self::KeyDown
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    PointerEnter,
    PointerLeave,
    PointerDown,
    PointerUp,
    Focus,
    Blur,
    Input,
    Click,
    KeyDown(String),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerEnter => EventKind::PointerEnter,
            Self::PointerLeave => EventKind::PointerLeave,
            Self::PointerDown => EventKind::PointerDown,
            Self::PointerUp => EventKind::PointerUp,
            Self::Focus => EventKind::Focus,
            Self::Blur => EventKind::Blur,
            Self::Input => EventKind::Input,
            Self::Click => EventKind::Click,
            Self::KeyDown(_) => EventKind::KeyDown,
        }
    }
}

/// Which element a style change lands on, relative to the listening one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Current,
    Parent,
}

/// What a listener does when its event fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Behavior {
    Style {
        scope: Scope,
        declarations: &'static [(&'static str, &'static str)],
    },
    /// Marks the field `border-green-500` when valid, `border-red-500` when
    /// invalid and non-empty.
    ValidityClasses,
    /// Scrolls to the element named by the listener's `href="#id"`.
    SmoothScroll,
    ToggleClass {
        selector: &'static str,
        class: &'static str,
    },
    /// Hides every `.dropdown` the click landed outside of.
    CloseDropdowns,
    /// Escape closes every open modal.
    DismissModals,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Document,
    Element(ElementId),
}

#[derive(Clone, Debug)]
struct Listener {
    target: Target,
    kind: EventKind,
    behavior: Behavior,
}

#[derive(Clone, Debug)]
pub struct Document {
    elements: Vec<Element>,
    listeners: Vec<Listener>,
    scrolled_to: Option<ElementId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty page holding only its `body`.
    pub fn new() -> Self {
        Self {
            elements: vec![Element {
                tag: "body".to_string(),
                ..Element::default()
            }],
            listeners: Vec::new(),
            scrolled_to: None,
        }
    }

    pub fn body(&self) -> ElementId {
        ElementId(0)
    }

    pub fn append(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            tag: tag.to_ascii_lowercase(),
            parent: Some(parent),
            ..Element::default()
        });
        self.elements[parent.0].children.push(id);
        id
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.0]
    }

    pub fn set_id(&mut self, id: ElementId, value: &str) -> &mut Self {
        self.elements[id.0].id = Some(value.to_string());
        self
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: &str) -> &mut Self {
        self.elements[id.0]
            .attrs
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements[id.0].attrs.get(name).map(String::as_str)
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) -> &mut Self {
        let classes = &mut self.elements[id.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
        self
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) -> &mut Self {
        self.elements[id.0].classes.retain(|c| c != class);
        self
    }

    pub fn toggle_class(&mut self, id: ElementId, class: &str) {
        if self.has_class(id, class) {
            self.remove_class(id, class);
        } else {
            self.add_class(id, class);
        }
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.elements[id.0].classes.iter().any(|c| c == class)
    }

    pub fn set_style(&mut self, id: ElementId, property: &str, value: &str) {
        self.elements[id.0]
            .style
            .insert(property.to_string(), value.to_string());
    }

    pub fn style(&self, id: ElementId, property: &str) -> Option<&str> {
        self.elements[id.0].style.get(property).map(String::as_str)
    }

    pub fn set_value(&mut self, id: ElementId, value: &str) {
        self.elements[id.0].value = value.to_string();
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements[id.0].parent
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.elements[id.0].children
    }

    pub fn previous_sibling(&self, id: ElementId) -> Option<ElementId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|s| *s == id)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    /// True when `node` is `ancestor` itself or lies anywhere below it.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn by_id(&self, value: &str) -> Option<ElementId> {
        self.walk()
            .into_iter()
            .find(|id| self.elements[id.0].id.as_deref() == Some(value))
    }

    /// Elements matching a CSS-like selector, in document order.
    ///
    /// Supports tag names, `.class`, `#id`, `[attr]`, `[attr="v"]`,
    /// `[attr^="v"]`, compound parts, descendant chains and `,` lists.
    pub fn select(&self, selector: &str) -> Vec<ElementId> {
        let groups: Vec<Vec<Compound>> = split_selector(selector, |c| c == ',')
            .into_iter()
            .map(|group| {
                split_selector(group, char::is_whitespace)
                    .into_iter()
                    .map(Compound::parse)
                    .collect()
            })
            .filter(|chain: &Vec<Compound>| !chain.is_empty())
            .collect();

        self.walk()
            .into_iter()
            .filter(|id| groups.iter().any(|chain| self.matches_chain(*id, chain)))
            .collect()
    }

    pub fn listen(&mut self, target: Target, kind: EventKind, behavior: Behavior) {
        self.listeners.push(Listener {
            target,
            kind,
            behavior,
        });
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn scrolled_to(&self) -> Option<ElementId> {
        self.scrolled_to
    }

    /// Fires `event` at `target`. Events that bubble reach every ancestor
    /// and finally the document.
    pub fn dispatch(&mut self, target: ElementId, event: Event) {
        let kind = event.kind();
        let mut path = vec![Target::Element(target)];
        if kind.bubbles() {
            let mut current = self.parent(target);
            while let Some(id) = current {
                path.push(Target::Element(id));
                current = self.parent(id);
            }
            path.push(Target::Document);
        }

        for current in path {
            let behaviors: Vec<Behavior> = self
                .listeners
                .iter()
                .filter(|l| l.target == current && l.kind == kind)
                .map(|l| l.behavior.clone())
                .collect();
            for behavior in behaviors {
                self.apply(&behavior, current, target, &event);
            }
        }
    }

    fn apply(&mut self, behavior: &Behavior, current: Target, origin: ElementId, event: &Event) {
        let listener = match current {
            Target::Element(id) => id,
            Target::Document => origin,
        };
        match behavior {
            Behavior::Style {
                scope,
                declarations,
            } => {
                let styled = match scope {
                    Scope::Current => Some(listener),
                    Scope::Parent => self.parent(listener),
                };
                if let Some(styled) = styled {
                    for (property, value) in declarations.iter() {
                        self.set_style(styled, property, value);
                    }
                }
            }
            Behavior::ValidityClasses => {
                self.remove_class(listener, "border-red-500")
                    .remove_class(listener, "border-green-500");
                if self.is_valid(listener) {
                    self.add_class(listener, "border-green-500");
                } else if !self.element(listener).value.is_empty() {
                    self.add_class(listener, "border-red-500");
                }
            }
            Behavior::SmoothScroll => {
                let anchor = self
                    .attr(listener, "href")
                    .and_then(|href| href.strip_prefix('#'))
                    .map(str::to_string);
                if let Some(found) = anchor.as_deref().and_then(|name| self.by_id(name)) {
                    self.scrolled_to = Some(found);
                }
            }
            Behavior::ToggleClass { selector, class } => {
                for id in self.select(selector) {
                    self.toggle_class(id, class);
                }
            }
            Behavior::CloseDropdowns => {
                for dropdown in self.select(".dropdown") {
                    let inside = self.contains(dropdown, origin)
                        || self
                            .previous_sibling(dropdown)
                            .is_some_and(|toggle| self.contains(toggle, origin));
                    if !inside {
                        self.add_class(dropdown, "hidden");
                    }
                }
            }
            Behavior::DismissModals => {
                if matches!(event, Event::KeyDown(key) if key == "Escape") {
                    for modal in self.select(".modal.show") {
                        self.remove_class(modal, "show");
                    }
                }
            }
        }
    }

    /// Constraint validation for form fields: `required`, `minlength`,
    /// `type="email"` and `type="number"`.
    pub fn is_valid(&self, id: ElementId) -> bool {
        let element = self.element(id);
        let value = element.value.as_str();
        if value.is_empty() {
            return !element.attrs.contains_key("required");
        }
        if let Some(min) = element
            .attrs
            .get("minlength")
            .and_then(|m| m.parse::<usize>().ok())
        {
            if value.chars().count() < min {
                return false;
            }
        }
        match element.attrs.get("type").map(String::as_str) {
            Some("email") => match value.split_once('@') {
                Some((local, domain)) => !local.is_empty() && domain.contains('.'),
                None => false,
            },
            Some("number") => value.trim().parse::<f64>().is_ok(),
            _ => true,
        }
    }

    fn walk(&self) -> Vec<ElementId> {
        let mut order = Vec::with_capacity(self.elements.len());
        let mut stack = vec![self.body()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    fn matches_chain(&self, id: ElementId, chain: &[Compound]) -> bool {
        let Some((last, ancestors)) = chain.split_last() else {
            return false;
        };
        if !last.matches(self.element(id)) {
            return false;
        }
        let mut current = self.parent(id);
        for compound in ancestors.iter().rev() {
            loop {
                match current {
                    Some(candidate) => {
                        current = self.parent(candidate);
                        if compound.matches(self.element(candidate)) {
                            break;
                        }
                    }
                    None => return false,
                }
            }
        }
        true
    }
}

/// Splits `text` at every `separator` that is outside `[...]` and quotes.
/// Empty pieces are dropped.
fn split_selector(text: &str, separator: impl Fn(char) -> bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (index, c) in text.char_indices() {
        match (quote, c) {
            (Some(open), _) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, _) if depth == 0 && separator(c) => {
                pieces.push(&text[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

#[derive(Debug)]
enum AttrTest {
    Present(String),
    Equals(String, String),
    Prefix(String, String),
}

impl Compound {
    fn parse(text: &str) -> Self {
        let mut compound = Compound::default();
        let mut rest = text;

        let tag_end = rest.find(['.', '#', '[']).unwrap_or(rest.len());
        if tag_end > 0 && &rest[..tag_end] != "*" {
            compound.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            match marker {
                '[' => {
                    let end = rest.find(']').unwrap_or(rest.len());
                    compound.attrs.push(AttrTest::parse(&rest[1..end]));
                    rest = rest.get(end + 1..).unwrap_or("");
                }
                _ => {
                    let body = &rest[marker.len_utf8()..];
                    let end = body.find(['.', '#', '[']).unwrap_or(body.len());
                    let name = body[..end].to_string();
                    if marker == '.' {
                        compound.classes.push(name);
                    } else {
                        compound.id = Some(name);
                    }
                    rest = &body[end..];
                }
            }
        }
        compound
    }

    fn matches(&self, element: &Element) -> bool {
        if self.tag.as_deref().is_some_and(|tag| tag != element.tag) {
            return false;
        }
        if self.id.is_some() && self.id != element.id {
            return false;
        }
        if !self
            .classes
            .iter()
            .all(|class| element.classes.iter().any(|c| c == class))
        {
            return false;
        }
        self.attrs.iter().all(|test| match test {
            AttrTest::Present(name) => element.attrs.contains_key(name),
            AttrTest::Equals(name, value) => element.attrs.get(name) == Some(value),
            AttrTest::Prefix(name, value) => element
                .attrs
                .get(name)
                .is_some_and(|actual| actual.starts_with(value.as_str())),
        })
    }
}

impl AttrTest {
    fn parse(body: &str) -> Self {
        let unquote = |v: &str| v.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
        if let Some((name, value)) = body.split_once("^=") {
            Self::Prefix(name.trim().to_string(), unquote(value))
        } else if let Some((name, value)) = body.split_once('=') {
            Self::Equals(name.trim().to_string(), unquote(value))
        } else {
            Self::Present(body.trim().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (Document, ElementId, ElementId, ElementId) {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.append(body, "nav");
        let link = doc.append(nav, "a");
        doc.set_attr(link, "href", "#contact");
        let table = doc.append(body, "table");
        let tbody = doc.append(table, "tbody");
        let row = doc.append(tbody, "tr");
        let section = doc.append(body, "section");
        doc.set_id(section, "contact");
        (doc, link, row, section)
    }

    #[test]
    fn selectors() {
        let (doc, link, row, section) = page();
        assert_eq!(doc.select(r##"a[href^="#"]"##), vec![link]);
        assert_eq!(doc.select("tbody tr"), vec![row]);
        assert_eq!(doc.select("table tr"), vec![row]);
        assert_eq!(doc.select("#contact"), vec![section]);
        assert_eq!(doc.select("nav tr"), Vec::<ElementId>::new());
        assert_eq!(doc.select("section, a").len(), 2);
        assert!(doc.select(".missing").is_empty());
    }

    #[test]
    fn quoted_attribute_values_keep_spaces() {
        let mut doc = Document::new();
        let body = doc.body();
        let toggle = doc.append(body, "button");
        doc.set_attr(toggle, "aria-label", "Toggle menu");
        let other = doc.append(body, "button");
        doc.set_attr(other, "aria-label", "Toggle");
        let tagged = doc.append(body, "span");
        doc.set_attr(tagged, "data-tags", "a, b");

        assert_eq!(doc.select(r#"[aria-label="Toggle menu"]"#), vec![toggle]);
        assert_eq!(doc.select(r#"body button[aria-label="Toggle menu"]"#), vec![toggle]);
        assert_eq!(doc.select(r#"[data-tags="a, b"], .none"#), vec![tagged]);
        assert_eq!(split_selector(" tbody   tr ", char::is_whitespace), vec!["tbody", "tr"]);
    }

    #[test]
    fn compound_class_selector() {
        let mut doc = Document::new();
        let body = doc.body();
        let open = doc.append(body, "div");
        doc.add_class(open, "modal").add_class(open, "show");
        let closed = doc.append(body, "div");
        doc.add_class(closed, "modal");
        assert_eq!(doc.select(".modal.show"), vec![open]);
        assert_eq!(doc.select("div.modal").len(), 2);
    }

    #[test]
    fn contains_walks_ancestors() {
        let (doc, link, row, _) = page();
        let nav = doc.parent(link).unwrap();
        assert!(doc.contains(nav, link));
        assert!(doc.contains(link, link));
        assert!(!doc.contains(nav, row));
    }

    #[test]
    fn click_bubbles_to_document() {
        let (mut doc, link, _, section) = page();
        doc.listen(Target::Element(link), EventKind::Click, Behavior::SmoothScroll);
        doc.dispatch(link, Event::Click);
        assert_eq!(doc.scrolled_to(), Some(section));
    }

    #[test]
    fn focus_does_not_bubble() {
        let (mut doc, link, _, _) = page();
        let nav = doc.parent(link).unwrap();
        doc.listen(
            Target::Element(nav),
            EventKind::Focus,
            Behavior::Style {
                scope: Scope::Current,
                declarations: &[("outline", "1px")],
            },
        );
        doc.dispatch(link, Event::Focus);
        assert_eq!(doc.style(nav, "outline"), None);
    }

    #[test]
    fn field_validity() {
        let mut doc = Document::new();
        let body = doc.body();
        let email = doc.append(body, "input");
        doc.set_attr(email, "type", "email").set_attr(email, "required", "");
        assert!(!doc.is_valid(email));
        doc.set_value(email, "ana@example.com");
        assert!(doc.is_valid(email));
        doc.set_value(email, "ana");
        assert!(!doc.is_valid(email));

        let qty = doc.append(body, "input");
        doc.set_attr(qty, "type", "number");
        doc.set_value(qty, "12");
        assert!(doc.is_valid(qty));
        doc.set_value(qty, "12abc");
        assert!(!doc.is_valid(qty));
    }
}

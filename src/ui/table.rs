/// One rendered table row. `class` is the row's visual state, `cells` its
/// visible text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub key: Option<i64>,
    pub cells: Vec<String>,
    pub class: String,
    pub hidden: bool,
}

impl Row {
    pub fn new(key: Option<i64>, cells: Vec<String>) -> Self {
        Self {
            key,
            cells,
            class: String::new(),
            hidden: false,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// The row's full text, cells joined by spaces.
    pub fn text(&self) -> String {
        self.cells.join(" ")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| !row.hidden)
    }

    pub fn replace_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
    }

    /// Shows a single full-width message row in place of the data.
    pub fn placeholder(&mut self, message: impl Into<String>) {
        self.rows = vec![Row::new(None, vec![message.into()]).with_class("placeholder")];
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Hides every row whose text does not contain `query`, ignoring case.
    /// An empty query shows everything again.
    pub fn filter(&mut self, query: &str) {
        let needle = query.to_lowercase();
        for row in &mut self.rows {
            row.hidden = !row.text().to_lowercase().contains(&needle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let mut table = Table::new();
        table.replace_rows(vec![
            Row::new(Some(1), vec!["Aspirin".into(), "AS-001".into(), "500 units".into()]),
            Row::new(Some(2), vec!["Amoxicillin".into(), "AM-002".into(), "30 units".into()]),
            Row::new(Some(3), vec!["Metformin".into(), "ME-003".into(), "75 units".into()]),
        ]);
        table
    }

    fn visible_keys(table: &Table) -> Vec<Option<i64>> {
        table.visible_rows().map(|row| row.key).collect()
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let mut table = table();
        table.filter("AM");
        assert_eq!(visible_keys(&table), vec![Some(2)]);

        table.filter("units");
        assert_eq!(visible_keys(&table), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn filter_matches_across_cells() {
        let mut table = table();
        table.filter("metformin me-003");
        assert_eq!(visible_keys(&table), vec![Some(3)]);
    }

    #[test]
    fn clearing_query_restores_rows() {
        let mut table = table();
        table.filter("nothing matches this");
        assert_eq!(table.visible_rows().count(), 0);

        table.filter("");
        assert_eq!(table.visible_rows().count(), 3);
    }

    #[test]
    fn placeholder_replaces_rows() {
        let mut table = table();
        table.placeholder("No sales records found");
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.rows()[0].text(), "No sales records found");
    }
}

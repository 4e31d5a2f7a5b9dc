use crate::model::Work;

const HEADERS: [&str; 4] = ["Id", "Title", "Language", "CreatorId"];

/// Render Works as a bordered text table followed by a row count
///
/// Columns are sized to their widest cell. An empty slice still renders the
/// header row and `Count: 0`.
///
/// # Example
///
/// ```
/// use folio_core::{render::render_works_table, Work};
///
/// let works = vec![Work { id: 41, title: "Young Zaphod".into(), language: None, creator_id: 1 }];
/// let table = render_works_table(&works);
/// assert!(table.contains("| 41 | Young Zaphod |"));
/// assert!(table.ends_with("Count: 1\n"));
/// ```
pub fn render_works_table(works: &[Work]) -> String {
    let rows: Vec<[String; 4]> = works
        .iter()
        .map(|w| {
            [
                w.id.to_string(),
                w.title.clone(),
                w.language.clone().unwrap_or_default(),
                w.creator_id.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_rule(&mut output, &widths);
    push_row(&mut output, &widths, HEADERS.iter().copied());
    push_rule(&mut output, &widths);
    for row in &rows {
        push_row(&mut output, &widths, row.iter().map(String::as_str));
    }
    push_rule(&mut output, &widths);
    output.push_str(&format!("\nCount: {}\n", works.len()));
    output
}

fn push_rule(output: &mut String, widths: &[usize; 4]) {
    for width in widths {
        output.push('+');
        output.push_str(&"-".repeat(width + 2));
    }
    output.push_str("+\n");
}

fn push_row<'a>(output: &mut String, widths: &[usize; 4], cells: impl Iterator<Item = &'a str>) {
    for (width, cell) in widths.iter().zip(cells) {
        let pad = width - cell.chars().count();
        output.push_str("| ");
        output.push_str(cell);
        output.push_str(&" ".repeat(pad + 1));
    }
    output.push_str("|\n");
}

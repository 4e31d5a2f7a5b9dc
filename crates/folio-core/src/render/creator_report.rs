use std::io::{self, Write};

use super::works_table::render_works_table;
use crate::model::Creator;

/// Render one block per Creator: a `Creator : {id} - {name}` line followed
/// by its works table
pub fn render_creator_report(creators: &[Creator]) -> String {
    let mut output = String::new();
    for creator in creators {
        output.push_str(&format!(
            "Creator : {} - {}\n",
            creator.id, creator.full_name
        ));
        output.push_str(&render_works_table(&creator.works));
        output.push('\n');
    }
    output
}

/// Write the creator report to a text sink
///
/// # Errors
/// Propagates write failures from `out`.
pub fn write_creator_report<W: Write>(out: &mut W, creators: &[Creator]) -> io::Result<()> {
    out.write_all(render_creator_report(creators).as_bytes())?;
    out.flush()
}

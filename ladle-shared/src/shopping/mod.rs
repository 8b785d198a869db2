/// Shopping-list generation
///
/// # Modules
///
/// - `aggregate`: pure merge of cart ingredient lines into one consolidated,
///   sorted list
/// - `render`: the document-renderer seam and the plain-text checklist
///   implementation
///
/// The pipeline: `Cart::shopping_lines` reads the raw lines, `consolidate`
/// merges and sorts them, a `DocumentRenderer` turns them into a printable
/// document.

pub mod aggregate;
pub mod render;

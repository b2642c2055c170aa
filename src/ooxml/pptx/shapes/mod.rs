/// Shape views over a slide tree.
///
/// Only the shapes templating needs are modelled:
/// - Tables inside graphic frames, tagged through their title or description
/// - Pictures, tagged through their description or title
pub mod picture;
pub mod table;

pub use picture::Picture;
pub use table::{Table, TableInfo, TableMut};

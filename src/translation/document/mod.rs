/*!
 * Document model and codecs.
 *
 * - `model`: blocks, paragraphs, runs, tables and opaque passthrough content
 * - `codec`: decoding/encoding the model and atomic load/save helpers
 */

pub mod codec;
pub mod model;

pub use codec::{DocumentCodec, JsonCodec, load_document, save_document};
pub use model::{
    Alignment, Block, Cell, Document, Formatting, OpaqueBlock, Paragraph, Row, Run, Table,
};

pub mod archive;
pub mod atom_names;
pub mod error;
pub mod external;
pub mod input_data;
pub mod outcome;
pub mod pipeline;
pub mod serde_default;
pub mod settings;
pub mod smiles;
pub mod utils;
pub mod workspace;

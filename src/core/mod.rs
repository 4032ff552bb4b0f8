pub mod compendium;
pub mod logging;

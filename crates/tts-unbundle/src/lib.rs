mod bundle;
mod markup;
mod paths;
mod script;
mod tree;

pub use bundle::{unbundle_modules, UnbundledModules};
pub use markup::unbundle_xml;
pub use script::unbundle_script;
pub use tree::VirtualTree;

pub const SCRIPT_EXT: &str = ".ttslua";
pub const XML_EXT: &str = ".xml";

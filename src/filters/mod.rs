pub(crate) mod descriptor;
pub(crate) mod layer_filter;
pub(crate) mod program;
pub(crate) mod variants;
pub(crate) mod vertices;

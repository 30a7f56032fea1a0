//! Macros shared by the data-holder types of the workspace.

mod array_macros;

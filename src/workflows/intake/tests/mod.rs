mod common;
mod package;
mod routing;

pub mod branding;
pub mod complaint;
pub mod project;
pub mod report;

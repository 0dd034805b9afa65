pub mod page_driver;
pub mod site_driver;

pub use page_driver::PageDriver;
pub use site_driver::{DriverFactory, Locator, SiteDriver, POLL_INTERVAL};

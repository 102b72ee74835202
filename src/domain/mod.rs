pub mod date;
pub mod period;
pub mod records;

pub use date::{month_range, parse_flexible_date, parse_month_label};
pub use period::{GroupedPeriodRow, Period};
pub use records::{Category, Project, ProjectPeriod, Travel, TravelData, TravelUpdate, User};

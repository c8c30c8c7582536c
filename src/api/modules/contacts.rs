use super::ModuleDescriptor;
use crate::domain::model::Method;

pub const NAME: &str = "Contacts";
pub const PRIMARY_KEY: &str = "CONTACTID";

pub fn descriptor() -> ModuleDescriptor {
    ModuleDescriptor::new(
        NAME,
        PRIMARY_KEY,
        [
            Method::GetFields,
            Method::GetRecordById,
            Method::GetRecords,
            Method::GetMyRecords,
            Method::SearchRecords,
            Method::InsertRecords,
            Method::UpdateRecords,
            Method::GetDeletedRecordIds,
        ],
    )
}

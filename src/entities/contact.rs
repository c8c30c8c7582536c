use super::definition::{AliasTable, EntityDefinition};
use crate::utils::error::Result;

pub const NAME: &str = "Contact";

const ALIASES: &[(&str, &str)] = &[
    ("id", "CONTACTID"),
    ("owner_id", "SMOWNERID"),
    ("owner_name", "Contact Owner"),
    ("first_name", "First Name"),
    ("last_name", "Last Name"),
    ("email", "Email"),
    ("secondary_email", "Secondary Email"),
    ("phone", "Phone"),
    ("mobile", "Mobile"),
    ("title", "Title"),
    ("department", "Department"),
    ("account_id", "ACCOUNTID"),
    ("account_name", "Account Name"),
    ("lead_source", "Lead Source"),
    ("date_of_birth", "Date of Birth"),
    ("mailing_street", "Mailing Street"),
    ("mailing_city", "Mailing City"),
    ("mailing_state", "Mailing State"),
    ("mailing_zip", "Mailing Zip"),
    ("mailing_country", "Mailing Country"),
    ("description", "Description"),
    ("email_opt_out", "Email Opt Out"),
    ("created_by_id", "SMCREATORID"),
    ("modified_by_id", "MODIFIEDBY"),
    ("created_at", "Created Time"),
    ("modified_at", "Modified Time"),
    ("last_activity_at", "Last Activity Time"),
];

pub fn definition() -> Result<EntityDefinition> {
    let aliases = AliasTable::new(NAME, ALIASES.iter().copied())?;
    Ok(EntityDefinition::new(NAME, aliases))
}

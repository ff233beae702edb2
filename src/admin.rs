// Admin registry - per-record listing configuration.
//
// Mirrors a back-office admin register: each record type is registered with
// the columns its list view shows, the fields free-text search covers, and
// the default ordering. RepCode gets a curated view; GeneralAccount and
// AccountHolder are registered with defaults (every scalar column, no
// search, no configured ordering).

use serde_json::{json, Map, Value};

use crate::records::{AccountHolder, GeneralAccount, RepCode};

// ============================================================================
// MODELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model {
    RepCode,
    GeneralAccount,
    AccountHolder,
}

impl Model {
    pub fn name(&self) -> &'static str {
        match self {
            Model::RepCode => "RepCode",
            Model::GeneralAccount => "GeneralAccount",
            Model::AccountHolder => "AccountHolder",
        }
    }

    /// Every scalar column of the record, in schema order. This is the
    /// default list view for models registered without customization.
    pub fn scalar_columns(&self) -> &'static [&'static str] {
        match self {
            Model::RepCode => &[
                "id",
                "rep_number",
                "rep_category",
                "name",
                "email_1",
                "email_2",
                "status",
                "country",
                "state",
                "city",
                "zip_code",
                "address",
                "phone_number",
                "sharing_agreement",
                "created",
                "modified",
            ],
            Model::GeneralAccount => &[
                "id",
                "account_number",
                "account_name",
                "rep_id",
                "status",
                "open_date",
                "close_date",
                "account_holders",
                "is_cash",
                "is_margin",
                "option_level",
                "country",
                "state",
                "city",
                "zip_code",
                "address",
                "phone_number",
                "created",
                "modified",
            ],
            Model::AccountHolder => &["id", "name", "account_id", "created", "modified"],
        }
    }
}

// ============================================================================
// MODEL ADMIN
// ============================================================================

/// Listing configuration for one record type.
#[derive(Debug, Clone)]
pub struct ModelAdmin {
    pub model: Model,
    pub list_display: Vec<&'static str>,
    pub search_fields: Vec<&'static str>,
    pub ordering: Option<&'static str>,
}

impl ModelAdmin {
    /// Register with framework defaults: all scalar columns, no search,
    /// no configured ordering.
    pub fn new(model: Model) -> Self {
        ModelAdmin {
            model,
            list_display: model.scalar_columns().to_vec(),
            search_fields: Vec::new(),
            ordering: None,
        }
    }

    /// Builder: restrict the visible list columns.
    pub fn with_list_display(mut self, columns: &[&'static str]) -> Self {
        self.list_display = columns.to_vec();
        self
    }

    /// Builder: enable free-text search over the given fields.
    pub fn with_search_fields(mut self, fields: &[&'static str]) -> Self {
        self.search_fields = fields.to_vec();
        self
    }

    /// Builder: ascending default ordering by the given column.
    pub fn with_ordering(mut self, column: &'static str) -> Self {
        self.ordering = Some(column);
        self
    }

    pub fn supports_search(&self) -> bool {
        !self.search_fields.is_empty()
    }

    /// Project a record onto the configured list columns.
    pub fn rep_row(&self, rep: &RepCode) -> Map<String, Value> {
        self.project(&rep_field_values(rep))
    }

    pub fn account_row(&self, acct: &GeneralAccount) -> Map<String, Value> {
        self.project(&account_field_values(acct))
    }

    pub fn holder_row(&self, holder: &AccountHolder) -> Map<String, Value> {
        self.project(&holder_field_values(holder))
    }

    fn project(&self, fields: &Map<String, Value>) -> Map<String, Value> {
        let mut row = Map::new();
        for col in &self.list_display {
            if let Some(value) = fields.get(*col) {
                row.insert((*col).to_string(), value.clone());
            }
        }
        row
    }
}

// ============================================================================
// FIELD PROJECTION
// ============================================================================

fn rep_field_values(rep: &RepCode) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("id".into(), json!(rep.id));
    m.insert("rep_number".into(), json!(rep.rep_number));
    m.insert("rep_category".into(), json!(rep.rep_category.label()));
    m.insert("name".into(), json!(rep.name));
    m.insert("email_1".into(), json!(rep.email_1));
    m.insert("email_2".into(), json!(rep.email_2));
    m.insert("status".into(), json!(rep.status.label()));
    m.insert("country".into(), json!(rep.address.country));
    m.insert("state".into(), json!(rep.address.state));
    m.insert("city".into(), json!(rep.address.city));
    m.insert("zip_code".into(), json!(rep.address.zip_code));
    m.insert("address".into(), json!(rep.address.address));
    m.insert("phone_number".into(), json!(rep.address.phone_number));
    m.insert("sharing_agreement".into(), json!(rep.sharing_agreement));
    m.insert("created".into(), json!(rep.created.to_rfc3339()));
    m.insert("modified".into(), json!(rep.modified.to_rfc3339()));
    m
}

fn account_field_values(acct: &GeneralAccount) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("id".into(), json!(acct.id));
    m.insert("account_number".into(), json!(acct.account_number));
    m.insert("account_name".into(), json!(acct.account_name));
    m.insert("rep_id".into(), json!(acct.rep_id));
    m.insert("status".into(), json!(acct.status.label()));
    m.insert(
        "open_date".into(),
        json!(acct.open_date.map(|d| d.to_string())),
    );
    m.insert(
        "close_date".into(),
        json!(acct.close_date.map(|d| d.to_string())),
    );
    m.insert("account_holders".into(), json!(acct.account_holders));
    m.insert("is_cash".into(), json!(acct.is_cash));
    m.insert("is_margin".into(), json!(acct.is_margin));
    m.insert("option_level".into(), json!(acct.option_level));
    m.insert("country".into(), json!(acct.address.country));
    m.insert("state".into(), json!(acct.address.state));
    m.insert("city".into(), json!(acct.address.city));
    m.insert("zip_code".into(), json!(acct.address.zip_code));
    m.insert("address".into(), json!(acct.address.address));
    m.insert("phone_number".into(), json!(acct.address.phone_number));
    m.insert("created".into(), json!(acct.created.to_rfc3339()));
    m.insert("modified".into(), json!(acct.modified.to_rfc3339()));
    m
}

fn holder_field_values(holder: &AccountHolder) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("id".into(), json!(holder.id));
    m.insert("name".into(), json!(holder.name));
    m.insert("account_id".into(), json!(holder.account_id));
    m.insert("created".into(), json!(holder.created.to_rfc3339()));
    m.insert("modified".into(), json!(holder.modified.to_rfc3339()));
    m
}

// ============================================================================
// ADMIN SITE
// ============================================================================

/// Catalog of registered record types and their listing configuration.
pub struct AdminSite {
    admins: Vec<ModelAdmin>,
}

impl AdminSite {
    pub fn new() -> Self {
        AdminSite { admins: Vec::new() }
    }

    pub fn register(&mut self, admin: ModelAdmin) {
        self.admins.retain(|a| a.model != admin.model);
        self.admins.push(admin);
    }

    pub fn admin_for(&self, model: Model) -> Option<&ModelAdmin> {
        self.admins.iter().find(|a| a.model == model)
    }

    pub fn registered_models(&self) -> Vec<Model> {
        self.admins.iter().map(|a| a.model).collect()
    }

    /// The back-office registrations: RepCode with a curated list view and
    /// search, the other two with defaults.
    pub fn default_registrations() -> Self {
        let mut site = AdminSite::new();
        site.register(
            ModelAdmin::new(Model::RepCode)
                .with_list_display(&["rep_number", "rep_category", "name"])
                .with_search_fields(&["rep_number", "name"])
                .with_ordering("rep_number"),
        );
        site.register(ModelAdmin::new(Model::GeneralAccount));
        site.register(ModelAdmin::new(Model::AccountHolder));
        site
    }
}

impl Default for AdminSite {
    fn default() -> Self {
        Self::default_registrations()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Address, RepCategory, Status};

    #[test]
    fn test_default_registrations() {
        let site = AdminSite::default_registrations();
        assert_eq!(site.registered_models().len(), 3);

        let rep_admin = site.admin_for(Model::RepCode).unwrap();
        assert_eq!(rep_admin.list_display, vec!["rep_number", "rep_category", "name"]);
        assert_eq!(rep_admin.search_fields, vec!["rep_number", "name"]);
        assert_eq!(rep_admin.ordering, Some("rep_number"));
        assert!(rep_admin.supports_search());
    }

    #[test]
    fn test_unregistered_defaults() {
        let site = AdminSite::default_registrations();

        let acct_admin = site.admin_for(Model::GeneralAccount).unwrap();
        assert_eq!(
            acct_admin.list_display,
            Model::GeneralAccount.scalar_columns().to_vec()
        );
        assert!(!acct_admin.supports_search());
        assert!(acct_admin.ordering.is_none());

        let holder_admin = site.admin_for(Model::AccountHolder).unwrap();
        assert_eq!(holder_admin.list_display.len(), 5);
    }

    #[test]
    fn test_rep_row_uses_configured_columns() {
        let site = AdminSite::default_registrations();
        let admin = site.admin_for(Model::RepCode).unwrap();

        let rep = RepCode::new(
            "007",
            RepCategory::ForeignFinder,
            "Jane Doe",
            "jane@example.com",
            Status::Open,
            Address::new("US"),
        );

        let row = admin.rep_row(&rep);
        assert_eq!(row.len(), 3);
        assert_eq!(row["rep_number"], "007");
        assert_eq!(row["rep_category"], "Foreign Finder");
        assert_eq!(row["name"], "Jane Doe");
        assert!(!row.contains_key("email_1"));
    }

    #[test]
    fn test_holder_row_has_all_scalars() {
        let site = AdminSite::default_registrations();
        let admin = site.admin_for(Model::AccountHolder).unwrap();

        let holder = AccountHolder::new("John Doe", "acct-1");
        let row = admin.holder_row(&holder);
        assert_eq!(row["name"], "John Doe");
        assert_eq!(row["account_id"], "acct-1");
        assert!(row.contains_key("created"));
    }

    #[test]
    fn test_reregistering_replaces() {
        let mut site = AdminSite::default_registrations();
        site.register(ModelAdmin::new(Model::RepCode));
        assert_eq!(site.registered_models().len(), 3);
        assert!(!site.admin_for(Model::RepCode).unwrap().supports_search());
    }
}

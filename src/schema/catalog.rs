//! Catalog of known source tables.
//!
//! Each entry names a staged table, the API path its pages are extracted
//! from, and the module that owns that path. Extra entries can be supplied
//! through configuration.

use super::table::TableSchema;

/// A static catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub source_path: &'static str,
    pub module: &'static str,
}

impl CatalogEntry {
    const fn new(name: &'static str, source_path: &'static str, module: &'static str) -> Self {
        Self {
            name,
            source_path,
            module,
        }
    }

    /// A fresh, column-less schema for this entry.
    pub fn to_schema(&self) -> TableSchema {
        TableSchema::new(self.name, self.source_path, self.module)
    }
}

// =============================================================================
// Known tables
// =============================================================================

pub static ALL_TABLES: &[CatalogEntry] = &[
    // Circulation
    CatalogEntry::new("circulation_cancellation_reasons", "/cancellation-reason-storage/cancellation-reasons", "mod-circulation-storage"),
    CatalogEntry::new("circulation_fixed_due_date_schedules", "/fixed-due-date-schedule-storage/fixed-due-date-schedules", "mod-circulation-storage"),
    CatalogEntry::new("circulation_loan_history", "/loan-storage/loan-history", "mod-circulation-storage"),
    CatalogEntry::new("circulation_loan_policies", "/loan-policy-storage/loan-policies", "mod-circulation-storage"),
    CatalogEntry::new("circulation_loans", "/loan-storage/loans", "mod-circulation-storage"),
    CatalogEntry::new("circulation_patron_action_sessions", "/patron-action-session-storage/patron-action-sessions", "mod-circulation-storage"),
    CatalogEntry::new("circulation_request_policies", "/request-policy-storage/request-policies", "mod-circulation-storage"),
    CatalogEntry::new("circulation_requests", "/request-storage/requests", "mod-circulation-storage"),
    CatalogEntry::new("circulation_staff_slips", "/staff-slips-storage/staff-slips", "mod-circulation-storage"),
    // Feesfines
    CatalogEntry::new("feesfines_accounts", "/accounts", "mod-feesfines"),
    CatalogEntry::new("feesfines_feefineactions", "/feefineactions", "mod-feesfines"),
    CatalogEntry::new("feesfines_feefines", "/feefines", "mod-feesfines"),
    CatalogEntry::new("feesfines_owners", "/owners", "mod-feesfines"),
    // Inventory
    CatalogEntry::new("inventory_holdings", "/holdings-storage/holdings", "mod-inventory-storage"),
    CatalogEntry::new("inventory_instances", "/instance-storage/instances", "mod-inventory-storage"),
    CatalogEntry::new("inventory_items", "/item-storage/items", "mod-inventory-storage"),
    CatalogEntry::new("inventory_locations", "/locations", "mod-inventory-storage"),
    CatalogEntry::new("inventory_loan_types", "/loan-types", "mod-inventory-storage"),
    CatalogEntry::new("inventory_material_types", "/material-types", "mod-inventory-storage"),
    CatalogEntry::new("inventory_service_points", "/service-points", "mod-inventory-storage"),
    // Orders and finance
    CatalogEntry::new("acquisitions_memberships", "/acquisitions-units-storage/memberships", "mod-orders-storage"),
    CatalogEntry::new("finance_funds", "/finance-storage/funds", "mod-finance-storage"),
    CatalogEntry::new("po_lines", "/orders-storage/po-lines", "mod-orders-storage"),
    CatalogEntry::new("po_purchase_orders", "/orders-storage/purchase-orders", "mod-orders-storage"),
    // Users
    CatalogEntry::new("user_groups", "/groups", "mod-users"),
    CatalogEntry::new("user_users", "/users", "mod-users"),
    // Agreements
    CatalogEntry::new("erm_agreements", "/erm/sas", "mod-agreements"),
];

/// Look up a known table by name.
pub fn get_table(name: &str) -> Option<&'static CatalogEntry> {
    ALL_TABLES.iter().find(|t| t.name == name)
}

/// Names of all known tables.
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

/// The known tables plus configured extras, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: Vec<TableSchema>,
}

impl Catalog {
    /// The static catalog.
    pub fn builtin() -> Self {
        Self {
            tables: ALL_TABLES.iter().map(CatalogEntry::to_schema).collect(),
        }
    }

    /// Add a table, replacing any existing entry of the same name.
    pub fn add(&mut self, table: TableSchema) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    /// Fresh schemas for the named tables, or every table when `names` is
    /// empty. Unknown names are returned as the error.
    pub fn select(&self, names: &[String]) -> Result<Vec<TableSchema>, Vec<String>> {
        if names.is_empty() {
            return Ok(self.tables.clone());
        }
        let unknown: Vec<String> = names
            .iter()
            .filter(|n| self.get(n).is_none())
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(unknown);
        }
        Ok(names.iter().filter_map(|n| self.get(n).cloned()).collect())
    }
}

//! Curated minimal configuration fragments for the typed provider
//!
//! Counterpart of the `azapi` table for resource types whose only sane
//! minimal form is the typed provider's resource (real IP ranges, SKUs,
//! tenant wiring). Same self-containment rule: every fragment carries
//! the blocks its last resource depends on.

pub use crate::azapi::CatalogEntry;

pub const RESOURCE_GROUP: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Resources/resourceGroups",
    hcl: r#"resource "azurerm_resource_group" "example" {
  name     = var.resource_name
  location = var.location
}
"#,
};

pub const VIRTUAL_NETWORK: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Network/virtualNetworks",
    hcl: r#"resource "azurerm_resource_group" "example" {
  name     = var.resource_name
  location = var.location
}

resource "azurerm_virtual_network" "example" {
  name                = var.resource_name
  resource_group_name = azurerm_resource_group.example.name
  location            = azurerm_resource_group.example.location
  address_space = [
    "10.0.0.0/16",
  ]
}
"#,
};

pub const SUBNET: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Network/virtualNetworks/subnets",
    hcl: r#"resource "azurerm_resource_group" "example" {
  name     = var.resource_name
  location = var.location
}

resource "azurerm_virtual_network" "example" {
  name                = var.resource_name
  resource_group_name = azurerm_resource_group.example.name
  location            = azurerm_resource_group.example.location
  address_space = [
    "10.0.0.0/16",
  ]
}

resource "azurerm_subnet" "example" {
  name                 = var.resource_name
  resource_group_name  = azurerm_resource_group.example.name
  virtual_network_name = azurerm_virtual_network.example.name
  address_prefixes = [
    "10.0.2.0/24",
  ]
}
"#,
};

pub const STORAGE_ACCOUNT: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Storage/storageAccounts",
    hcl: r#"resource "azurerm_resource_group" "example" {
  name     = var.resource_name
  location = var.location
}

resource "azurerm_storage_account" "example" {
  name                     = var.resource_name
  resource_group_name      = azurerm_resource_group.example.name
  location                 = azurerm_resource_group.example.location
  account_tier             = "Standard"
  account_replication_type = "LRS"
}
"#,
};

pub const USER_ASSIGNED_IDENTITY: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.ManagedIdentity/userAssignedIdentities",
    hcl: r#"resource "azurerm_resource_group" "example" {
  name     = var.resource_name
  location = var.location
}

resource "azurerm_user_assigned_identity" "example" {
  name                = var.resource_name
  resource_group_name = azurerm_resource_group.example.name
  location            = azurerm_resource_group.example.location
}
"#,
};

pub const PUBLIC_IP_ADDRESS: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Network/publicIPAddresses",
    hcl: r#"resource "azurerm_resource_group" "example" {
  name     = var.resource_name
  location = var.location
}

resource "azurerm_public_ip" "example" {
  name                = var.resource_name
  resource_group_name = azurerm_resource_group.example.name
  location            = azurerm_resource_group.example.location
  allocation_method   = "Static"
  sku                 = "Standard"
}
"#,
};

pub const NETWORK_SECURITY_GROUP: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Network/networkSecurityGroups",
    hcl: r#"resource "azurerm_resource_group" "example" {
  name     = var.resource_name
  location = var.location
}

resource "azurerm_network_security_group" "example" {
  name                = var.resource_name
  resource_group_name = azurerm_resource_group.example.name
  location            = azurerm_resource_group.example.location
}
"#,
};

pub const LOG_ANALYTICS_WORKSPACE: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.OperationalInsights/workspaces",
    hcl: r#"resource "azurerm_resource_group" "example" {
  name     = var.resource_name
  location = var.location
}

resource "azurerm_log_analytics_workspace" "example" {
  name                = var.resource_name
  resource_group_name = azurerm_resource_group.example.name
  location            = azurerm_resource_group.example.location
  sku                 = "PerGB2018"
  retention_in_days   = 30
}
"#,
};

pub const KEY_VAULT: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.KeyVault/vaults",
    hcl: r#"data "azurerm_client_config" "current" {
}

resource "azurerm_resource_group" "example" {
  name     = var.resource_name
  location = var.location
}

resource "azurerm_key_vault" "example" {
  name                = var.resource_name
  resource_group_name = azurerm_resource_group.example.name
  location            = azurerm_resource_group.example.location
  tenant_id           = data.azurerm_client_config.current.tenant_id
  sku_name            = "standard"
}
"#,
};

/// All curated fragments for the typed provider.
pub fn all_entries() -> &'static [CatalogEntry] {
    const ENTRIES: &[CatalogEntry] = &[
        RESOURCE_GROUP,
        VIRTUAL_NETWORK,
        SUBNET,
        STORAGE_ACCOUNT,
        USER_ASSIGNED_IDENTITY,
        PUBLIC_IP_ADDRESS,
        NETWORK_SECURITY_GROUP,
        LOG_ANALYTICS_WORKSPACE,
        KEY_VAULT,
    ];
    ENTRIES
}

/// Exact ARM-type lookup, case-insensitive.
pub fn lookup(resource_type: &str) -> Option<&'static CatalogEntry> {
    all_entries()
        .iter()
        .find(|entry| entry.resource_type.eq_ignore_ascii_case(resource_type))
}

//! Curated minimal configuration fragments for the generic provider
//!
//! Each fragment is self-contained: it carries every block its last
//! resource depends on, so merging it into a document that already holds
//! some of those blocks simply reuses them. The last resource/data block
//! in a fragment is the one the dependency reference points at.

/// One curated dependency fragment.
pub struct CatalogEntry {
    /// ARM resource type the fragment satisfies.
    pub resource_type: &'static str,
    /// Raw block text to merge verbatim.
    pub hcl: &'static str,
}

pub const RESOURCE_GROUP: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Resources/resourceGroups",
    hcl: r#"resource "azapi_resource" "resourceGroup" {
  type     = "Microsoft.Resources/resourceGroups@2023-07-01"
  name     = var.resource_name
  location = var.location
}
"#,
};

pub const VIRTUAL_NETWORK: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Network/virtualNetworks",
    hcl: r#"resource "azapi_resource" "resourceGroup" {
  type     = "Microsoft.Resources/resourceGroups@2023-07-01"
  name     = var.resource_name
  location = var.location
}

resource "azapi_resource" "virtualNetwork" {
  type      = "Microsoft.Network/virtualNetworks@2023-04-01"
  parent_id = azapi_resource.resourceGroup.id
  name      = var.resource_name
  location  = var.location
  body = {
    properties = {
      addressSpace = {
        addressPrefixes = [
          "10.0.0.0/16",
        ]
      }
    }
  }
}
"#,
};

pub const SUBNET: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Network/virtualNetworks/subnets",
    hcl: r#"resource "azapi_resource" "resourceGroup" {
  type     = "Microsoft.Resources/resourceGroups@2023-07-01"
  name     = var.resource_name
  location = var.location
}

resource "azapi_resource" "virtualNetwork" {
  type      = "Microsoft.Network/virtualNetworks@2023-04-01"
  parent_id = azapi_resource.resourceGroup.id
  name      = var.resource_name
  location  = var.location
  body = {
    properties = {
      addressSpace = {
        addressPrefixes = [
          "10.0.0.0/16",
        ]
      }
    }
  }
}

resource "azapi_resource" "subnet" {
  type      = "Microsoft.Network/virtualNetworks/subnets@2023-04-01"
  parent_id = azapi_resource.virtualNetwork.id
  name      = var.resource_name
  body = {
    properties = {
      addressPrefix = "10.0.2.0/24"
    }
  }
}
"#,
};

pub const STORAGE_ACCOUNT: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Storage/storageAccounts",
    hcl: r#"resource "azapi_resource" "resourceGroup" {
  type     = "Microsoft.Resources/resourceGroups@2023-07-01"
  name     = var.resource_name
  location = var.location
}

resource "azapi_resource" "storageAccount" {
  type      = "Microsoft.Storage/storageAccounts@2023-01-01"
  parent_id = azapi_resource.resourceGroup.id
  name      = var.resource_name
  location  = var.location
  body = {
    kind = "StorageV2"
    sku = {
      name = "Standard_LRS"
    }
  }
}
"#,
};

pub const USER_ASSIGNED_IDENTITY: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.ManagedIdentity/userAssignedIdentities",
    hcl: r#"resource "azapi_resource" "resourceGroup" {
  type     = "Microsoft.Resources/resourceGroups@2023-07-01"
  name     = var.resource_name
  location = var.location
}

resource "azapi_resource" "userAssignedIdentity" {
  type      = "Microsoft.ManagedIdentity/userAssignedIdentities@2023-01-31"
  parent_id = azapi_resource.resourceGroup.id
  name      = var.resource_name
  location  = var.location
}
"#,
};

pub const PUBLIC_IP_ADDRESS: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Network/publicIPAddresses",
    hcl: r#"resource "azapi_resource" "resourceGroup" {
  type     = "Microsoft.Resources/resourceGroups@2023-07-01"
  name     = var.resource_name
  location = var.location
}

resource "azapi_resource" "publicIPAddress" {
  type      = "Microsoft.Network/publicIPAddresses@2023-04-01"
  parent_id = azapi_resource.resourceGroup.id
  name      = var.resource_name
  location  = var.location
  body = {
    sku = {
      name = "Standard"
    }
    properties = {
      publicIPAllocationMethod = "Static"
    }
  }
}
"#,
};

pub const NETWORK_SECURITY_GROUP: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Network/networkSecurityGroups",
    hcl: r#"resource "azapi_resource" "resourceGroup" {
  type     = "Microsoft.Resources/resourceGroups@2023-07-01"
  name     = var.resource_name
  location = var.location
}

resource "azapi_resource" "networkSecurityGroup" {
  type      = "Microsoft.Network/networkSecurityGroups@2023-04-01"
  parent_id = azapi_resource.resourceGroup.id
  name      = var.resource_name
  location  = var.location
}
"#,
};

pub const LOG_ANALYTICS_WORKSPACE: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.OperationalInsights/workspaces",
    hcl: r#"resource "azapi_resource" "resourceGroup" {
  type     = "Microsoft.Resources/resourceGroups@2023-07-01"
  name     = var.resource_name
  location = var.location
}

resource "azapi_resource" "workspace" {
  type      = "Microsoft.OperationalInsights/workspaces@2022-10-01"
  parent_id = azapi_resource.resourceGroup.id
  name      = var.resource_name
  location  = var.location
  body = {
    properties = {
      sku = {
        name = "PerGB2018"
      }
      retentionInDays = 30
    }
  }
}
"#,
};

pub const KEY_VAULT: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.KeyVault/vaults",
    hcl: r#"data "azurerm_client_config" "current" {
}

resource "azapi_resource" "resourceGroup" {
  type     = "Microsoft.Resources/resourceGroups@2023-07-01"
  name     = var.resource_name
  location = var.location
}

resource "azapi_resource" "vault" {
  type      = "Microsoft.KeyVault/vaults@2023-02-01"
  parent_id = azapi_resource.resourceGroup.id
  name      = var.resource_name
  location  = var.location
  body = {
    properties = {
      tenantId = "${data.azurerm_client_config.current.tenant_id}"
      sku = {
        family = "A"
        name   = "standard"
      }
      accessPolicies = []
    }
  }
}
"#,
};

pub const APP_SERVICE_PLAN: CatalogEntry = CatalogEntry {
    resource_type: "Microsoft.Web/serverfarms",
    hcl: r#"resource "azapi_resource" "resourceGroup" {
  type     = "Microsoft.Resources/resourceGroups@2023-07-01"
  name     = var.resource_name
  location = var.location
}

resource "azapi_resource" "serverfarm" {
  type      = "Microsoft.Web/serverfarms@2022-09-01"
  parent_id = azapi_resource.resourceGroup.id
  name      = var.resource_name
  location  = var.location
  body = {
    sku = {
      name = "B1"
      tier = "Basic"
    }
    properties = {
      reserved = true
    }
  }
}
"#,
};

/// All curated fragments for the generic provider.
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
        APP_SERVICE_PLAN,
    ];
    ENTRIES
}

/// Exact ARM-type lookup, case-insensitive.
pub fn lookup(resource_type: &str) -> Option<&'static CatalogEntry> {
    all_entries()
        .iter()
        .find(|entry| entry.resource_type.eq_ignore_ascii_case(resource_type))
}

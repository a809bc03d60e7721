//! Mapping between typed-provider declared types and ARM resource types
//!
//! The generic provider carries the ARM type in its `type` attribute;
//! typed-provider blocks need this table to participate in dependency
//! matching.

use std::collections::HashMap;

/// (declared type, ARM resource type)
pub type TypeMapping = (&'static str, &'static str);

pub const TYPE_MAPPINGS: &[TypeMapping] = &[
    ("azurerm_resource_group", "Microsoft.Resources/resourceGroups"),
    ("azurerm_virtual_network", "Microsoft.Network/virtualNetworks"),
    ("azurerm_subnet", "Microsoft.Network/virtualNetworks/subnets"),
    ("azurerm_storage_account", "Microsoft.Storage/storageAccounts"),
    (
        "azurerm_user_assigned_identity",
        "Microsoft.ManagedIdentity/userAssignedIdentities",
    ),
    ("azurerm_public_ip", "Microsoft.Network/publicIPAddresses"),
    (
        "azurerm_network_security_group",
        "Microsoft.Network/networkSecurityGroups",
    ),
    (
        "azurerm_network_interface",
        "Microsoft.Network/networkInterfaces",
    ),
    (
        "azurerm_log_analytics_workspace",
        "Microsoft.OperationalInsights/workspaces",
    ),
    ("azurerm_key_vault", "Microsoft.KeyVault/vaults"),
    ("azurerm_application_insights", "Microsoft.Insights/components"),
    ("azurerm_service_plan", "Microsoft.Web/serverfarms"),
    ("azurerm_kubernetes_cluster", "Microsoft.ContainerService/managedClusters"),
    ("azurerm_container_registry", "Microsoft.ContainerRegistry/registries"),
    ("azurerm_mssql_server", "Microsoft.Sql/servers"),
    ("azurerm_cosmosdb_account", "Microsoft.DocumentDB/databaseAccounts"),
    ("azurerm_eventhub_namespace", "Microsoft.EventHub/namespaces"),
    ("azurerm_servicebus_namespace", "Microsoft.ServiceBus/namespaces"),
];

/// The ARM type a declared type maps to.
pub fn arm_type_of(declared_type: &str) -> Option<&'static str> {
    TYPE_MAPPINGS
        .iter()
        .find(|(declared, _)| *declared == declared_type)
        .map(|(_, arm)| *arm)
}

/// Owned declared-type -> ARM-type table, in the shape the existing
/// dependency scanner consumes.
pub fn azurerm_type_map() -> HashMap<String, String> {
    TYPE_MAPPINGS
        .iter()
        .map(|(declared, arm)| (declared.to_string(), arm.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups() {
        assert_eq!(
            arm_type_of("azurerm_resource_group"),
            Some("Microsoft.Resources/resourceGroups")
        );
        assert_eq!(arm_type_of("azurerm_unknown"), None);
    }

    #[test]
    fn map_covers_all_mappings() {
        let map = azurerm_type_map();
        assert_eq!(map.len(), TYPE_MAPPINGS.len());
        assert_eq!(
            map.get("azurerm_key_vault").map(String::as_str),
            Some("Microsoft.KeyVault/vaults")
        );
    }
}

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_vendors_table::Migration),
            Box::new(m20240101_000002_create_inventory_items_table::Migration),
            Box::new(m20240101_000003_create_restock_schedules_table::Migration),
            Box::new(m20240101_000004_create_restock_orders_table::Migration),
        ]
    }
}

mod m20240101_000001_create_vendors_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_vendors_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vendors::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vendors::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Vendors::Name).string().not_null())
                        .col(ColumnDef::new(Vendors::Phone).string())
                        .col(ColumnDef::new(Vendors::Email).string())
                        .col(
                            ColumnDef::new(Vendors::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Vendors::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Vendors {
        Table,
        Id,
        Name,
        Phone,
        Email,
        Active,
        CreatedAt,
    }
}

mod m20240101_000002_create_inventory_items_table {
    use super::m20240101_000001_create_vendors_table::Vendors;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_inventory_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(InventoryItems::Name).string().not_null())
                        .col(ColumnDef::new(InventoryItems::Sku).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::CurrentStock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::ReorderPoint)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::ReorderQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::Unit)
                                .string()
                                .not_null()
                                .default("units"),
                        )
                        .col(ColumnDef::new(InventoryItems::VendorId).uuid())
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_items_vendor")
                                .from(InventoryItems::Table, InventoryItems::VendorId)
                                .to(Vendors::Table, Vendors::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum InventoryItems {
        Table,
        Id,
        Name,
        Sku,
        CurrentStock,
        ReorderPoint,
        ReorderQuantity,
        Unit,
        VendorId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_restock_schedules_table {
    use super::m20240101_000002_create_inventory_items_table::InventoryItems;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_restock_schedules_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RestockSchedules::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RestockSchedules::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(RestockSchedules::InventoryItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RestockSchedules::FrequencyDays)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RestockSchedules::LastCheckDate)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(RestockSchedules::NextCheckDate)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(RestockSchedules::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(RestockSchedules::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_restock_schedules_item")
                                .from(RestockSchedules::Table, RestockSchedules::InventoryItemId)
                                .to(InventoryItems::Table, InventoryItems::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RestockSchedules::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum RestockSchedules {
        Table,
        Id,
        InventoryItemId,
        FrequencyDays,
        LastCheckDate,
        NextCheckDate,
        Active,
        CreatedAt,
    }
}

mod m20240101_000004_create_restock_orders_table {
    use super::m20240101_000001_create_vendors_table::Vendors;
    use super::m20240101_000002_create_inventory_items_table::InventoryItems;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_restock_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RestockOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RestockOrders::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(RestockOrders::InventoryItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RestockOrders::VendorId).uuid())
                        .col(ColumnDef::new(RestockOrders::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(RestockOrders::Status)
                                .string()
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(RestockOrders::OrderDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RestockOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_restock_orders_item")
                                .from(RestockOrders::Table, RestockOrders::InventoryItemId)
                                .to(InventoryItems::Table, InventoryItems::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_restock_orders_vendor")
                                .from(RestockOrders::Table, RestockOrders::VendorId)
                                .to(Vendors::Table, Vendors::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RestockOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum RestockOrders {
        Table,
        Id,
        InventoryItemId,
        VendorId,
        Quantity,
        Status,
        OrderDate,
        CreatedAt,
    }
}

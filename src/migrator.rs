#![allow(elided_lifetimes_in_paths)]

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_vehicles_table::Migration),
            Box::new(m20250101_000002_create_inventory_records_table::Migration),
            Box::new(m20250101_000003_create_promotions_table::Migration),
            Box::new(m20250101_000004_create_quotations_table::Migration),
            Box::new(m20250101_000005_create_orders_table::Migration),
        ]
    }
}

mod m20250101_000001_create_vehicles_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_vehicles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vehicles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Vehicles::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Vehicles::ModelName).string().not_null())
                        .col(
                            ColumnDef::new(Vehicles::Status)
                                .string()
                                .not_null()
                                .default("available"),
                        )
                        .col(ColumnDef::new(Vehicles::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vehicles::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Vehicles {
        Table,
        Id,
        ModelName,
        Status,
        CreatedAt,
    }
}

mod m20250101_000002_create_inventory_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_inventory_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryRecords::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::VehicleId)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::Status)
                                .string()
                                .not_null()
                                .default("available"),
                        )
                        .col(ColumnDef::new(InventoryRecords::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryRecords::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum InventoryRecords {
        Table,
        Id,
        VehicleId,
        Quantity,
        Status,
        UpdatedAt,
    }
}

mod m20250101_000003_create_promotions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_promotions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Promotions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Promotions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Promotions::PromotionCode)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Promotions::OptionName).string().not_null())
                        .col(ColumnDef::new(Promotions::OptionValue).string().null())
                        .col(ColumnDef::new(Promotions::StartDate).timestamp().not_null())
                        .col(ColumnDef::new(Promotions::EndDate).timestamp().not_null())
                        .col(ColumnDef::new(Promotions::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Promotions::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_promotions_code")
                        .table(Promotions::Table)
                        .col(Promotions::PromotionCode)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Promotions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Promotions {
        Table,
        Id,
        PromotionCode,
        OptionName,
        OptionValue,
        StartDate,
        EndDate,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000004_create_quotations_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_quotations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Quotations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Quotations::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Quotations::UserId).integer().not_null())
                        .col(ColumnDef::new(Quotations::VehicleId).integer().not_null())
                        .col(
                            ColumnDef::new(Quotations::QuotationDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Quotations::Color).string().not_null())
                        .col(
                            ColumnDef::new(Quotations::BasePrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Quotations::Discount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Quotations::FinalPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Quotations::PromotionCode).string().null())
                        .col(
                            ColumnDef::new(Quotations::PromotionOptionName)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(Quotations::Status).string().not_null())
                        .col(ColumnDef::new(Quotations::AttachmentUrl).string().null())
                        .col(ColumnDef::new(Quotations::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Quotations::UpdatedAt).timestamp().null())
                        .col(
                            ColumnDef::new(Quotations::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Quotations::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Quotations {
        Table,
        Id,
        UserId,
        VehicleId,
        QuotationDate,
        Color,
        BasePrice,
        Discount,
        FinalPrice,
        PromotionCode,
        PromotionOptionName,
        Status,
        AttachmentUrl,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20250101_000005_create_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::QuotationId).integer().not_null())
                        .col(ColumnDef::new(Orders::UserId).integer().not_null())
                        .col(ColumnDef::new(Orders::VehicleId).integer().not_null())
                        .col(ColumnDef::new(Orders::Color).string().not_null())
                        .col(ColumnDef::new(Orders::OrderDate).timestamp().not_null())
                        .col(ColumnDef::new(Orders::DeliveryAddress).string().null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::PromotionCode).string().null())
                        .col(ColumnDef::new(Orders::PromotionOptionName).string().null())
                        .col(
                            ColumnDef::new(Orders::QuotationPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::FinalPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_quotation_id")
                                .from(Orders::Table, Orders::QuotationId)
                                .to(Quotations::Table, Quotations::Id),
                        )
                        .to_owned(),
                )
                .await?;

            // One order per quotation, enforced at the persistence layer so
            // concurrent conversions cannot both land.
            manager
                .create_index(
                    Index::create()
                        .name("uq_orders_quotation_id")
                        .table(Orders::Table)
                        .col(Orders::QuotationId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Orders {
        Table,
        Id,
        QuotationId,
        UserId,
        VehicleId,
        Color,
        OrderDate,
        DeliveryAddress,
        Status,
        PromotionCode,
        PromotionOptionName,
        QuotationPrice,
        FinalPrice,
        TotalAmount,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Quotations {
        Table,
        Id,
    }
}

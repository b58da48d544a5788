use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // domains 表
        manager
            .create_table(
                Table::create()
                    .table(Domain::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Domain::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Domain::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Domain::RemoteZoneId).string().null())
                    .col(
                        ColumnDef::new(Domain::DelegationStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Domain::ZoneCreatedAt).string().null())
                    .col(ColumnDef::new(Domain::LastSyncedAt).string().null())
                    .col(
                        ColumnDef::new(Domain::RecordCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Domain::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Domain::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // dns_records 表
        manager
            .create_table(
                Table::create()
                    .table(DnsRecord::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DnsRecord::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DnsRecord::DomainId).big_integer().not_null())
                    .col(ColumnDef::new(DnsRecord::Name).string().not_null())
                    .col(ColumnDef::new(DnsRecord::RecordType).string().not_null())
                    .col(ColumnDef::new(DnsRecord::Value).string().not_null())
                    .col(ColumnDef::new(DnsRecord::Ttl).big_integer().not_null())
                    .col(ColumnDef::new(DnsRecord::Priority).integer().null())
                    .col(ColumnDef::new(DnsRecord::Weight).integer().null())
                    .col(ColumnDef::new(DnsRecord::Source).string().not_null())
                    .col(ColumnDef::new(DnsRecord::CreatedByRouteId).big_integer().null())
                    .col(ColumnDef::new(DnsRecord::CreatedAt).string().not_null())
                    .col(ColumnDef::new(DnsRecord::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dns_records_domain")
                            .from(DnsRecord::Table, DnsRecord::DomainId)
                            .to(Domain::Table, Domain::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同步和冲突检查都按 (domain_id, name) 查询
        manager
            .create_index(
                Index::create()
                    .name("idx_dns_records_domain_name")
                    .table(DnsRecord::Table)
                    .if_not_exists()
                    .col(DnsRecord::DomainId)
                    .col(DnsRecord::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dns_records_route")
                    .table(DnsRecord::Table)
                    .if_not_exists()
                    .col(DnsRecord::CreatedByRouteId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DnsRecord::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Domain::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Domain {
    #[sea_orm(iden = "domains")]
    Table,
    Id,
    Name,
    RemoteZoneId,
    DelegationStatus,
    ZoneCreatedAt,
    LastSyncedAt,
    RecordCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DnsRecord {
    #[sea_orm(iden = "dns_records")]
    Table,
    Id,
    DomainId,
    Name,
    RecordType,
    Value,
    Ttl,
    Priority,
    Weight,
    Source,
    CreatedByRouteId,
    CreatedAt,
    UpdatedAt,
}

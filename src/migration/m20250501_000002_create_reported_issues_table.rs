use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ReportedIssues {
    Table,
    Id,
    ImageUrl,
    Location,
    Description,
    Tags,
    Status,
    ReportedAt,
    UserId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportedIssues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportedIssues::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReportedIssues::ImageUrl).text().not_null())
                    .col(ColumnDef::new(ReportedIssues::Location).text().not_null())
                    .col(
                        ColumnDef::new(ReportedIssues::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ReportedIssues::Tags)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReportedIssues::Status)
                            .string_len(50)
                            .not_null()
                            .default("submitted"),
                    )
                    .col(
                        ColumnDef::new(ReportedIssues::ReportedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ReportedIssues::UserId)
                            .string_len(255)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReportedIssues::Table).to_owned())
            .await
    }
}

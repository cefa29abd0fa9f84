use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ReportedIssues {
    Table,
    UserId,
    Status,
    ReportedAt,
}

const INDEXES: [(&str, ReportedIssues); 3] = [
    ("idx_reported_issues_user_id", ReportedIssues::UserId),
    ("idx_reported_issues_status", ReportedIssues::Status),
    ("idx_reported_issues_reported_at", ReportedIssues::ReportedAt),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, column) in INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(ReportedIssues::Table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in INDEXES {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table(ReportedIssues::Table)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}

//! 喜欢的视频实体定义

use sea_orm::entity::prelude::*;

/// 表中并没有声明主键，url 上的唯一约束承担了主键的角色
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Default)]
#[sea_orm(table_name = "videos")]
pub struct Model {
    pub title: String,
    #[sea_orm(primary_key, auto_increment = false, unique)]
    pub url: String,
    pub views: i64,
    pub likes: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

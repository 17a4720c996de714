use sea_orm::{
    ColumnTrait,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};

const LIKE_ESCAPE: char = '\\';

/// Case-insensitive substring match on a text column.
///
/// `%`, `_` and `\` in the needle match literally.
pub trait ContainsIgnoreCase {
    fn contains_ignore_case(self, needle: &str) -> SimpleExpr;
}

impl<C> ContainsIgnoreCase for C
where
    C: ColumnTrait + 'static,
{
    fn contains_ignore_case(self, needle: &str) -> SimpleExpr {
        let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
        Expr::expr(Func::lower(Expr::col(self))).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
    }
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

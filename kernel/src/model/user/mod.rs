// ユーザーの作成・更新はユーザーディレクトリ側（外部）の管轄。
// このクレートでは予約一覧に表示名を付けるための読み取り専用の型だけを持つ。

#[derive(Debug, PartialEq, Eq)]
pub struct ReservationUser {
    pub user_name: String,
    pub email: String,
}

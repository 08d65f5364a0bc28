//! SQLite bindings through `sqlx`.
//!
//! [`EncryptedValue`] binds as a TEXT parameter holding its storable form.
//! Reading goes through [`StoredCell`], which accepts TEXT or BLOB cells and
//! refuses anything else, then [`EncryptedValue::scan`] decrypts it in place.

use sqlx::{
    Database, Decode, Encode, Row, Sqlite, Type, ValueRef,
    encode::IsNull,
    error::BoxDynError,
    sqlite::{SqliteRow, SqliteTypeInfo, SqliteValueRef},
};

use crate::{error::CryptError, traits::Cipher, value::EncryptedValue};

/// Raw bytes of a stored cell, as handed over by the database.
///
/// TEXT cells are taken as their UTF-8 bytes. NULL and numeric cells are
/// rejected instead of being reinterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCell(Vec<u8>);

impl StoredCell {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for StoredCell {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<String> for StoredCell {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl AsRef<[u8]> for StoredCell {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Type<Sqlite> for StoredCell {
    fn type_info() -> SqliteTypeInfo {
        <Vec<u8> as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <String as Type<Sqlite>>::compatible(ty) || <Vec<u8> as Type<Sqlite>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Sqlite> for StoredCell {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        if value.is_null() {
            return Err(CryptError::UnexpectedCell(
                "NULL where an encrypted value was expected".to_string(),
            )
            .into());
        }
        let bytes = <&[u8] as Decode<'r, Sqlite>>::decode(value)?;
        Ok(Self(bytes.to_vec()))
    }
}

impl<C: Cipher> Type<Sqlite> for EncryptedValue<C> {
    fn type_info() -> SqliteTypeInfo {
        <String as Type<Sqlite>>::type_info()
    }
}

impl<'q, C: Cipher> Encode<'q, Sqlite> for EncryptedValue<C> {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        let storable = self.to_storable()?;
        <String as Encode<'q, Sqlite>>::encode(storable, buf)
    }
}

impl<C: Cipher> EncryptedValue<C> {
    /// Populate the plaintext from a cell the storage layer already fetched.
    pub fn from_cell(&mut self, cell: &StoredCell) -> Result<(), CryptError> {
        self.from_storable(cell.as_bytes())
    }

    /// Read `column` from `row` and decrypt it into this value.
    pub fn scan(&mut self, row: &SqliteRow, column: &str) -> Result<(), CryptError> {
        let cell: StoredCell = row.try_get(column)?;
        self.from_cell(&cell)
    }
}

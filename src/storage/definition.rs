use crate::db::table::core::constraint::{CheckConstraint, ForeignKey, ReferentialAction, UniqueConstraint};
use crate::db::table::core::field::{Constraint, DataType, Field};
use crate::db::table::core::table::{Table, TableDefinition};
use crate::error::{DbError, Result};
use crate::interpreter::parse_condition;
use crate::storage::codec::{ByteReader, ByteWriter};

pub const NAME_WIDTH: usize = 128;
pub const ENUM_WIDTH: usize = 512;

const FLAG_PRIMARY_KEY: u8 = 0x01;
const FLAG_NOT_NULL: u8 = 0x02;
const FLAG_UNIQUE: u8 = 0x04;
const ABSENT: i32 = -1;

/// `.tdf` layout: field count, fixed-size field blocks, then the foreign key,
/// default, check and unique sections, each prefixed by its entry count.
pub fn encode_definition(table: &Table) -> Result<Vec<u8>> {
    let mut writer = ByteWriter::new();
    writer.put_count(table.fields.len())?;
    for field in &table.fields {
        write_field(&mut writer, field)?;
    }

    writer.put_count(table.foreign_keys.len())?;
    for foreign_key in &table.foreign_keys {
        writer.put_string(&foreign_key.name)?;
        writer.put_string(&foreign_key.referenced_table)?;
        writer.put_count(foreign_key.columns.len())?;
        for (column, referenced) in foreign_key.columns.iter().zip(&foreign_key.referenced_columns) {
            writer.put_string(column)?;
            writer.put_string(referenced)?;
        }
        writer.put_u8(foreign_key.on_delete.code());
        writer.put_u8(foreign_key.on_update.code());
    }

    writer.put_count(table.defaults.len())?;
    for (field, expression) in &table.defaults {
        writer.put_string(field)?;
        writer.put_string(expression)?;
    }

    writer.put_count(table.check_constraints.len())?;
    for check in &table.check_constraints {
        writer.put_string(&check.name)?;
        writer.put_string(&check.expression())?;
    }

    writer.put_count(table.unique_constraints.len())?;
    for unique in &table.unique_constraints {
        writer.put_string(&unique.name)?;
        writer.put_count(unique.columns.len())?;
        for column in &unique.columns {
            writer.put_string(column)?;
        }
    }
    Ok(writer.into_bytes())
}

pub fn decode_definition(bytes: &[u8]) -> Result<TableDefinition> {
    let mut reader = ByteReader::new(bytes);
    let mut definition = TableDefinition::default();

    for _ in 0..reader.read_count()? {
        let field = read_field(&mut reader)?;
        if field.is_primary_key() {
            definition.primary_key.push(field.name.clone());
        }
        definition.fields.push(field);
    }

    for _ in 0..reader.read_count()? {
        let name = reader.read_string()?;
        let referenced_table = reader.read_string()?;
        let mut columns = vec![];
        let mut referenced_columns = vec![];
        for _ in 0..reader.read_count()? {
            columns.push(reader.read_string()?);
            referenced_columns.push(reader.read_string()?);
        }
        let on_delete = read_action(&mut reader)?;
        let on_update = read_action(&mut reader)?;
        definition.foreign_keys.push(ForeignKey {
            name,
            columns,
            referenced_table,
            referenced_columns,
            on_delete,
            on_update,
        });
    }

    for _ in 0..reader.read_count()? {
        let field = reader.read_string()?;
        let expression = reader.read_string()?;
        definition.defaults.insert(field, expression);
    }

    for _ in 0..reader.read_count()? {
        let name = reader.read_string()?;
        let expression = reader.read_string()?;
        let condition = parse_condition(&expression).map_err(|error| {
            DbError::malformed(format!("CHECK `{}` does not parse: {}", name, error))
        })?;
        definition
            .check_constraints
            .push(CheckConstraint { name, condition });
    }

    for _ in 0..reader.read_count()? {
        let name = reader.read_string()?;
        let mut columns = vec![];
        for _ in 0..reader.read_count()? {
            columns.push(reader.read_string()?);
        }
        definition
            .unique_constraints
            .push(UniqueConstraint { name, columns });
    }

    if !reader.is_at_end() {
        return Err(DbError::malformed("trailing bytes after table definition"));
    }
    Ok(definition)
}

fn write_field(writer: &mut ByteWriter, field: &Field) -> Result<()> {
    writer.put_fixed_string(&field.name, NAME_WIDTH)?;
    writer.put_u8(field.data_type.code());
    let param = match field.data_type {
        DataType::Decimal => field.precision(),
        _ => field.size(),
    };
    writer.put_i32(param.map_or(ABSENT, |param| param as i32));
    writer.put_i32(field.scale().map_or(ABSENT, |scale| scale as i32));
    let mut flags = 0;
    if field.is_primary_key() {
        flags |= FLAG_PRIMARY_KEY;
    }
    if field.is_not_null() {
        flags |= FLAG_NOT_NULL;
    }
    if field.is_unique() {
        flags |= FLAG_UNIQUE;
    }
    writer.put_u8(flags);
    writer.put_fixed_string(&field.enum_values.join(","), ENUM_WIDTH)?;
    Ok(())
}

fn read_field(reader: &mut ByteReader) -> Result<Field> {
    let name = reader.read_fixed_string(NAME_WIDTH)?;
    if name.is_empty() {
        return Err(DbError::malformed("field block with an empty name"));
    }
    let code = reader.read_u8()?;
    let data_type = DataType::from_code(code)
        .ok_or_else(|| DbError::malformed(format!("unknown type code {} for `{}`", code, name)))?;
    let param = reader.read_i32()?;
    let scale = reader.read_i32()?;
    let flags = reader.read_u8()?;
    let enum_values = reader.read_fixed_string(ENUM_WIDTH)?;

    let mut field = Field::new(name, data_type);
    if flags & FLAG_PRIMARY_KEY != 0 {
        field.add_constraint(Constraint::PrimaryKey);
    }
    if flags & FLAG_NOT_NULL != 0 {
        field.add_constraint(Constraint::NotNull);
    }
    if flags & FLAG_UNIQUE != 0 {
        field.add_constraint(Constraint::Unique);
    }
    if param >= 0 {
        field.add_constraint(match data_type {
            DataType::Decimal => Constraint::Precision(param as u32),
            _ => Constraint::Size(param as u32),
        });
    }
    if scale >= 0 {
        field.add_constraint(Constraint::Scale(scale as u32));
    }
    if data_type == DataType::Enum && !enum_values.is_empty() {
        field.enum_values = enum_values.split(',').map(str::to_string).collect();
    }
    Ok(field)
}

fn read_action(reader: &mut ByteReader) -> Result<ReferentialAction> {
    let code = reader.read_u8()?;
    ReferentialAction::from_code(code)
        .ok_or_else(|| DbError::malformed(format!("unknown referential action code {}", code)))
}

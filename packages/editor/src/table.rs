//! Table editing commands.
//!
//! Every action rebuilds the table around the cursor and swaps it in with a
//! single replace step. Removing the last row or column removes the table.

use crate::document::EditorState;
use crate::errors::EditorResult;
use crate::selection::Selection;
use crate::transaction::{Origin, Transaction};
use quire_model::builders::empty_cell;
use quire_model::{AttrValue, Node, NodeKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableCommand {
    AddRowBefore,
    AddRowAfter,
    DeleteRow,
    AddColumnBefore,
    AddColumnAfter,
    DeleteColumn,
    DeleteTable,
    SetCellBackground { color: Option<String> },
}

/// The table around the cursor.
struct TableContext {
    pos: usize,
    table: Node,
    row: usize,
    col: usize,
    /// Position before the cell holding the cursor.
    cell_pos: usize,
}

fn context(state: &EditorState) -> EditorResult<Option<TableContext>> {
    let doc = state.doc();
    let from = state.selection().from(doc);
    let r = doc.resolve(from)?;
    let Some(depth) = r.depth_of(NodeKind::Table) else {
        return Ok(None);
    };
    if r.depth() < depth + 2 {
        return Ok(None);
    }
    Ok(Some(TableContext {
        pos: r.before(depth),
        table: r.node(depth).clone(),
        row: r.index(depth),
        col: r.index(depth + 1),
        cell_pos: r.before(depth + 2),
    }))
}

pub fn apply(state: &EditorState, command: &TableCommand) -> EditorResult<Option<Transaction>> {
    let Some(ctx) = context(state)? else {
        return Ok(None);
    };
    let mut tr = state.tr();
    tr.set_origin(Origin::Command);

    if let TableCommand::SetCellBackground { color } = command {
        let Some(cell) = state.doc().node_at(ctx.cell_pos) else {
            return Ok(None);
        };
        let mut attrs = cell.attrs().clone();
        let value = color.clone().map_or(AttrValue::Null, AttrValue::Str);
        attrs.set(cell.kind(), "background", value)?;
        tr.set_node_attrs(ctx.cell_pos, attrs)?;
        return Ok(Some(tr));
    }

    let mut rows: Vec<Vec<Node>> = ctx
        .table
        .children()
        .iter()
        .map(|row| row.children().to_vec())
        .collect();
    let (mut row, mut col) = (ctx.row, ctx.col);

    match command {
        TableCommand::AddRowBefore | TableCommand::AddRowAfter => {
            let width = rows[row].len();
            let at = if *command == TableCommand::AddRowAfter {
                row + 1
            } else {
                row += 1;
                row - 1
            };
            rows.insert(at, (0..width).map(|_| empty_cell()).collect());
        }
        TableCommand::DeleteRow => {
            rows.remove(row);
            row = row.min(rows.len().saturating_sub(1));
        }
        TableCommand::AddColumnBefore | TableCommand::AddColumnAfter => {
            let at = if *command == TableCommand::AddColumnAfter {
                col + 1
            } else {
                col += 1;
                col - 1
            };
            for cells in &mut rows {
                cells.insert(at.min(cells.len()), empty_cell());
            }
        }
        TableCommand::DeleteColumn => {
            for cells in &mut rows {
                if col < cells.len() {
                    cells.remove(col);
                }
            }
            rows.retain(|cells| !cells.is_empty());
            col = col.saturating_sub(1);
            row = row.min(rows.len().saturating_sub(1));
        }
        TableCommand::DeleteTable | TableCommand::SetCellBackground { .. } => rows.clear(),
    }

    let end = ctx.pos + ctx.table.node_size();
    if rows.is_empty() {
        tr.delete(ctx.pos, end)?;
        tr.set_selection(Selection::near(tr.doc(), ctx.pos))?;
        return Ok(Some(tr));
    }

    let row_nodes: Vec<Node> = ctx
        .table
        .children()
        .iter()
        .cycle()
        .zip(rows)
        .map(|(template, cells)| template.with_content(cells))
        .collect();
    let table = ctx.table.with_content(row_nodes);
    let cell = cell_position(ctx.pos, &table, row, col);
    tr.replace(ctx.pos, end, vec![table])?;
    tr.set_selection(Selection::near(tr.doc(), cell + 1))?;
    Ok(Some(tr))
}

/// Position before the cell at `row`, `col` (clamped) of a table at `pos`.
fn cell_position(pos: usize, table: &Node, row: usize, col: usize) -> usize {
    let rows = table.children();
    let row = row.min(rows.len().saturating_sub(1));
    let mut at = pos + 1 + rows[..row].iter().map(Node::node_size).sum::<usize>();
    if let Some(cells) = rows.get(row).map(Node::children) {
        let col = col.min(cells.len().saturating_sub(1));
        at += 1 + cells[..col].iter().map(Node::node_size).sum::<usize>();
    }
    at
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_model::builders::*;

    // table at 4: row at 5, first cell at 6, its paragraph at 7, text at 8
    fn state_in_table(rows: usize, cols: usize, cursor: usize) -> EditorState {
        EditorState::new(doc(vec![page(vec![], vec![table(rows, cols)], vec![])]))
            .unwrap()
            .with_selection(Selection::cursor(cursor))
            .unwrap()
    }

    fn shape(state: &EditorState) -> Vec<usize> {
        state
            .doc()
            .node_at(4)
            .filter(|n| n.kind() == NodeKind::Table)
            .map(|t| t.children().iter().map(Node::child_count).collect())
            .unwrap_or_default()
    }

    fn run(state: &EditorState, command: TableCommand) -> EditorState {
        let tr = apply(state, &command).unwrap().unwrap();
        state.apply(&tr).unwrap()
    }

    #[test]
    fn test_add_and_delete_rows() {
        let state = state_in_table(2, 2, 8);
        let more = run(&state, TableCommand::AddRowAfter);
        assert_eq!(shape(&more), vec![2, 2, 2]);
        assert_eq!(more.selection(), Selection::cursor(8));

        let before = run(&state, TableCommand::AddRowBefore);
        assert_eq!(shape(&before), vec![2, 2, 2]);
        // the cursor's row moved down by one row (2 cells of 4 plus 2)
        assert_eq!(before.selection(), Selection::cursor(18));

        let fewer = run(&state, TableCommand::DeleteRow);
        assert_eq!(shape(&fewer), vec![2]);
    }

    #[test]
    fn test_add_and_delete_columns() {
        let state = state_in_table(2, 2, 8);
        let wider = run(&state, TableCommand::AddColumnBefore);
        assert_eq!(shape(&wider), vec![3, 3]);
        assert_eq!(wider.selection(), Selection::cursor(12));

        let narrower = run(&state, TableCommand::DeleteColumn);
        assert_eq!(shape(&narrower), vec![1, 1]);
    }

    #[test]
    fn test_last_row_deletes_table() {
        let state = state_in_table(1, 3, 8);
        let gone = run(&state, TableCommand::DeleteRow);
        assert!(gone.doc().pages()[0].content_blocks().is_empty());

        let state = state_in_table(2, 1, 8);
        let gone = run(&state, TableCommand::DeleteColumn);
        assert!(shape(&gone).is_empty());
    }

    #[test]
    fn test_cell_background() {
        let state = state_in_table(1, 1, 8);
        let colored = run(
            &state,
            TableCommand::SetCellBackground {
                color: Some("#ffee00".into()),
            },
        );
        let cell = colored.doc().node_at(6).unwrap();
        assert_eq!(cell.attrs().background(), Some("#ffee00"));
    }

    #[test]
    fn test_outside_table_is_noop() {
        let state = EditorState::new(doc(vec![page(vec![], vec![paragraph("a")], vec![])])).unwrap();
        assert!(apply(&state, &TableCommand::DeleteTable).unwrap().is_none());
    }
}

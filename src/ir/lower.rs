//! Lowers one [`AnalyzedQuery`] into emission IR (spec §4.I).

use crate::analyze::AnalyzedQuery;
use crate::block::Command;
use crate::query::Verb;
use crate::types::{ResolvedType, SemanticType};

use super::{Declaration, EffectStep, FieldDecl, FuncDecl, ParamDecl, ResultType, TypeDecl};

fn row_type_name(block_name: &str) -> String {
    format!("{block_name}Row")
}

fn query_const_name(block_name: &str) -> String {
    format!("{block_name}Query")
}

fn row_struct(analyzed: &AnalyzedQuery) -> TypeDecl {
    let fields = analyzed
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let name = c.alias.clone().unwrap_or_else(|| format!("column{i}"));
            FieldDecl {
                source_column: Some(name.clone()),
                name,
                semantic_type: c.resolved_type.clone(),
            }
        })
        .collect();
    TypeDecl::Struct {
        name: row_type_name(&analyzed.block_name),
        fields,
    }
}

fn params(analyzed: &AnalyzedQuery) -> Vec<ParamDecl> {
    analyzed
        .params
        .iter()
        .map(|p| ParamDecl {
            name: p.name.clone(),
            semantic_type: p.resolved_type.clone(),
            variadic: p.is_variadic,
        })
        .collect()
}

fn slice_replacement_steps(analyzed: &AnalyzedQuery) -> Vec<EffectStep> {
    analyzed
        .params
        .iter()
        .filter(|p| p.is_variadic)
        .map(|p| EffectStep::ReplaceSliceMarker(p.name.clone()))
        .collect()
}

/// Spec §4.I: a `FuncDecl`'s result is either a `SemanticType`, a
/// reference to a declared row type, or `Unit`, and its effect-step
/// sequence is finite and drawn from the fixed step vocabulary.
pub fn lower_query(analyzed: &AnalyzedQuery) -> Vec<Declaration> {
    let mut decls = Vec::new();
    let const_ref = query_const_name(&analyzed.block_name);

    let mut steps = vec![EffectStep::PrepareQuery(const_ref)];
    steps.extend(slice_replacement_steps(analyzed));

    let result = match (analyzed.verb, analyzed.command) {
        (Verb::Select, Command::Many) if !analyzed.columns.is_empty() => {
            let row_name = row_type_name(&analyzed.block_name);
            decls.push(Declaration::Type(row_struct(analyzed)));
            steps.push(EffectStep::QueryManyRows(row_name.clone()));
            steps.push(EffectStep::ScanRow(row_name.clone()));
            ResultType::Row(row_name)
        }
        (Verb::Select, _) if !analyzed.columns.is_empty() => {
            let row_name = row_type_name(&analyzed.block_name);
            decls.push(Declaration::Type(row_struct(analyzed)));
            steps.push(EffectStep::QueryOneRow(row_name.clone()));
            steps.push(EffectStep::ScanRow(row_name.clone()));
            ResultType::Row(row_name)
        }
        (_, Command::ExecResult) => {
            steps.push(EffectStep::ExecReturningLastID);
            ResultType::Scalar(ResolvedType::new(SemanticType::BigInteger, false))
        }
        (_, Command::Exec) => {
            steps.push(EffectStep::ExecReturningRowsAffected);
            ResultType::Scalar(ResolvedType::new(SemanticType::BigInteger, false))
        }
        _ => ResultType::Unit,
    };

    decls.push(Declaration::Func(FuncDecl {
        name: analyzed.block_name.clone(),
        params: params(analyzed),
        result,
        steps,
    }));
    decls
}

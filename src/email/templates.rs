pub fn render_verification_code(name: &str, code: &str, base_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Confirme seu email</h2>
    <p>Olá {name},</p>
    <p>Use o código abaixo para ativar sua conta na intranet:</p>
    <p style="font-size: 32px; letter-spacing: 8px; font-weight: bold; text-align: center; background: #f0f9ff; padding: 16px; border-radius: 8px;">{code}</p>
    <p><a href="{base_url}/login" style="display: inline-block; padding: 10px 20px; background: #1e40af; color: white; text-decoration: none; border-radius: 4px;">Abrir a intranet</a></p>
    <p style="color: #666; font-size: 14px;">O código expira em 24 horas. Se você não fez este cadastro, ignore este email.</p>
</body>
</html>"#
    )
}

pub fn render_password_reset_code(name: &str, code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Redefinição de senha</h2>
    <p>Olá {name},</p>
    <p>Recebemos um pedido para redefinir a sua senha. Informe o código abaixo:</p>
    <p style="font-size: 32px; letter-spacing: 8px; font-weight: bold; text-align: center; background: #f0f9ff; padding: 16px; border-radius: 8px;">{code}</p>
    <p style="color: #666; font-size: 14px;">O código expira em 1 hora. Se você não pediu a redefinição, ignore este email.</p>
</body>
</html>"#
    )
}
